//! # Conversation controller
//!
//! The wizard state machine. Given an inbound event (photo upload, button
//! selection, command, plain text) it drives the per-chat session through
//! photo → brand → item → branch, and on the terminal transition calls the
//! vision analyzer and composes the final reply from the analysis verdict
//! plus the brand's reference records.
//!
//! `handle_event` is infallible: every failure path (missing image,
//! analyzer error) is mapped to a fixed user-visible reply and the state
//! machine returns to `Idle`, never leaving the stores inconsistent.

use std::sync::Arc;

use teloxide::types::ChatId;
use tracing::{debug, error, info, warn};

use crate::reference_parser::ReferenceRecord;
use crate::reference_store::ReferenceStore;
use crate::session::{SessionStore, WizardState};
use crate::vision::{AnalysisContext, VisionAnalyzer};
use crate::{catalog, messages};

/// Closed set of recognized slash commands, matched once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    /// `/reference` followed by the replacement reference text.
    Reference(String),
}

impl Command {
    pub fn parse(text: &str) -> Option<Command> {
        let trimmed = text.trim();
        if trimmed == "/start" || trimmed.starts_with("/start ") {
            return Some(Command::Start);
        }
        if let Some(rest) = trimmed.strip_prefix("/reference") {
            if rest.is_empty() || rest.starts_with(char::is_whitespace) {
                return Some(Command::Reference(rest.trim().to_string()));
            }
        }
        None
    }
}

/// A wizard button press, decoded from the opaque callback payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Brand(String),
    /// Empty string means the step was skipped.
    Item(String),
    Branch(String),
}

impl Selection {
    /// Decode a callback payload. Unknown payloads yield `None` and are
    /// ignored by the controller.
    pub fn parse(data: &str) -> Option<Selection> {
        let (kind, value) = data.split_once(':')?;
        let value = value.to_string();
        match kind {
            "brand" => Some(Selection::Brand(value)),
            "item" => Some(Selection::Item(value)),
            "branch" => Some(Selection::Branch(value)),
            _ => None,
        }
    }

    fn payload(kind: &str, value: &str) -> String {
        format!("{kind}:{value}")
    }
}

/// Inbound event, already stripped of transport details.
#[derive(Debug, Clone)]
pub enum Event {
    Start,
    PhotoUploaded { image: Vec<u8> },
    Selected(Selection),
    ReferenceUpdate { body: String },
    PlainText,
}

/// One button of an outbound choice menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuButton {
    pub label: String,
    pub payload: String,
}

impl MenuButton {
    fn new(label: impl Into<String>, payload: String) -> Self {
        Self {
            label: label.into(),
            payload,
        }
    }
}

/// Outbound action for the transport layer to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    Text(String),
    Menu {
        text: String,
        rows: Vec<Vec<MenuButton>>,
    },
}

/// The state machine plus its collaborators.
pub struct Controller {
    sessions: SessionStore,
    reference: Arc<ReferenceStore>,
    analyzer: Arc<dyn VisionAnalyzer>,
}

impl Controller {
    pub fn new(
        sessions: SessionStore,
        reference: Arc<ReferenceStore>,
        analyzer: Arc<dyn VisionAnalyzer>,
    ) -> Self {
        Self {
            sessions,
            reference,
            analyzer,
        }
    }

    /// Run one state-machine step for a chat and return the outbound
    /// actions. The chat's session lock is held for the whole step, so two
    /// concurrent events for the same chat cannot interleave.
    pub async fn handle_event(&self, chat_id: ChatId, event: Event) -> Vec<Outbound> {
        match event {
            Event::Start => {
                let handle = self.sessions.get_or_create(chat_id);
                handle.lock().await.state = WizardState::Idle;
                vec![Outbound::Text(messages::GREETING.to_string())]
            }
            Event::PlainText => vec![Outbound::Text(messages::GENERIC_INSTRUCTION.to_string())],
            Event::ReferenceUpdate { body } => self.handle_reference_update(&body),
            Event::PhotoUploaded { image } => {
                let handle = self.sessions.get_or_create(chat_id);
                handle.lock().await.reset_with_image(image);
                info!(chat_id = %chat_id, "photo stored, wizard restarted");
                vec![self.brand_menu()]
            }
            Event::Selected(selection) => self.handle_selection(chat_id, selection).await,
        }
    }

    fn handle_reference_update(&self, body: &str) -> Vec<Outbound> {
        if body.is_empty() {
            return vec![Outbound::Text(messages::REFERENCE_USAGE.to_string())];
        }

        self.reference.replace(body);
        let brands = self.reference.brands();
        let skipped = self.reference.skipped_lines();
        let mut confirmation = format!(
            "{}\nبرندها: {}",
            messages::REFERENCE_UPDATED,
            brands.join("، ")
        );
        if skipped > 0 {
            confirmation.push_str(&format!("\n({skipped} خط نامعتبر نادیده گرفته شد)"));
        }
        vec![Outbound::Text(confirmation)]
    }

    async fn handle_selection(&self, chat_id: ChatId, selection: Selection) -> Vec<Outbound> {
        let handle = self.sessions.get_or_create(chat_id);
        let mut session = handle.lock().await;
        let state = session.state.clone();

        match (selection, state) {
            // A brand pick (re)starts the selection pass in any state.
            (Selection::Brand(brand), _) => {
                debug!(chat_id = %chat_id, brand = %brand, "brand selected");
                let menu = item_menu(&brand);
                session.state = WizardState::AwaitingItem { brand };
                vec![menu]
            }
            (Selection::Item(item), WizardState::AwaitingItem { brand }) => {
                debug!(chat_id = %chat_id, item = %item, "item selected");
                session.state = WizardState::AwaitingBranch { brand, item };
                vec![branch_menu()]
            }
            (Selection::Branch(branch), WizardState::AwaitingBranch { brand, item }) => {
                let Some(image) = session.image.clone() else {
                    warn!(chat_id = %chat_id, "terminal step without a stored photo");
                    return vec![Outbound::Text(messages::SEND_PHOTO_FIRST.to_string())];
                };

                info!(chat_id = %chat_id, brand = %brand, "terminal transition, running analysis");
                let reply = self.analyze_and_compose(&image, &brand, &item, &branch).await;
                session.state = WizardState::Idle;
                vec![Outbound::Text(reply)]
            }
            // Selection arrived in a state that does not expect it, e.g. a
            // stale button from an earlier menu. Dropped; the transport
            // still acknowledges the callback.
            (selection, state) => {
                debug!(chat_id = %chat_id, selection = ?selection, state = ?state, "selection ignored in current state");
                Vec::new()
            }
        }
    }

    async fn analyze_and_compose(
        &self,
        image: &[u8],
        brand: &str,
        item: &str,
        branch: &str,
    ) -> String {
        let records = self.reference.lookup(brand);
        let first = records.first();
        let ctx = AnalysisContext {
            brand: brand.to_string(),
            item: item.to_string(),
            oven_temp: first.and_then(|record| record.temperature.clone()),
            bake_time: first.and_then(|record| record.time.clone()),
        };

        match self.analyzer.analyze(image, &ctx).await {
            Ok(verdict) => compose_reply(&verdict, brand, item, branch, &records),
            Err(e) => {
                error!(error = %e, brand = %brand, "analysis failed");
                messages::PROCESSING_FAILED.to_string()
            }
        }
    }

    /// Brand choice menu: every brand the reference store knows (parsed
    /// keys plus the static catalog), no duplicates.
    fn brand_menu(&self) -> Outbound {
        let rows = self
            .reference
            .brands()
            .into_iter()
            .map(|brand| {
                let payload = Selection::payload("brand", &brand);
                vec![MenuButton::new(brand, payload)]
            })
            .collect();
        Outbound::Menu {
            text: messages::CHOOSE_BRAND.to_string(),
            rows,
        }
    }
}

fn item_menu(brand: &str) -> Outbound {
    let mut rows: Vec<Vec<MenuButton>> = catalog::items_for(brand)
        .iter()
        .map(|item| vec![MenuButton::new(*item, Selection::payload("item", item))])
        .collect();
    rows.push(vec![MenuButton::new(
        messages::SKIP,
        Selection::payload("item", ""),
    )]);
    Outbound::Menu {
        text: messages::CHOOSE_ITEM.to_string(),
        rows,
    }
}

fn branch_menu() -> Outbound {
    let mut rows: Vec<Vec<MenuButton>> = catalog::branches()
        .iter()
        .map(|branch| vec![MenuButton::new(*branch, Selection::payload("branch", branch))])
        .collect();
    rows.push(vec![MenuButton::new(
        messages::SKIP,
        Selection::payload("branch", ""),
    )]);
    Outbound::Menu {
        text: messages::CHOOSE_BRANCH.to_string(),
        rows,
    }
}

/// Final reply: the two-line verdict verbatim, then a reference block when
/// the brand has records. Bullets show temperature and, when present,
/// `| time`, in source insertion order.
fn compose_reply(
    analysis: &str,
    brand: &str,
    item: &str,
    branch: &str,
    records: &[ReferenceRecord],
) -> String {
    if records.is_empty() {
        return analysis.to_string();
    }

    let mut header_parts = vec![brand.to_string()];
    if !item.is_empty() {
        header_parts.push(item.to_string());
    }
    if !branch.is_empty() {
        header_parts.push(branch.to_string());
    }

    let mut reply = format!(
        "{analysis}\n{}\nمرجع: {}",
        messages::REFERENCE_SEPARATOR,
        header_parts.join(" | ")
    );
    for record in records {
        let mut bullet_parts = Vec::new();
        if let Some(temp) = &record.temperature {
            bullet_parts.push(temp.as_str());
        }
        if let Some(time) = &record.time {
            bullet_parts.push(time.as_str());
        }
        reply.push_str(&format!("\n• {}", bullet_parts.join(" | ")));
    }
    reply
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_parse_start() {
        assert_eq!(Command::parse("/start"), Some(Command::Start));
        assert_eq!(Command::parse("  /start extra  "), Some(Command::Start));
        assert_eq!(Command::parse("/started"), None);
    }

    #[test]
    fn test_command_parse_reference_with_body() {
        let cmd = Command::parse("/reference\nپلنت 240 درجه");
        assert_eq!(cmd, Some(Command::Reference("پلنت 240 درجه".to_string())));
    }

    #[test]
    fn test_command_parse_reference_without_body() {
        assert_eq!(Command::parse("/reference"), Some(Command::Reference(String::new())));
        assert_eq!(Command::parse("/references"), None);
    }

    #[test]
    fn test_command_parse_plain_text() {
        assert_eq!(Command::parse("سلام"), None);
    }

    #[test]
    fn test_selection_parse_roundtrip() {
        assert_eq!(
            Selection::parse("brand:پلنت"),
            Some(Selection::Brand("پلنت".to_string()))
        );
        assert_eq!(Selection::parse("item:"), Some(Selection::Item(String::new())));
        assert_eq!(
            Selection::parse("branch:ونک"),
            Some(Selection::Branch("ونک".to_string()))
        );
    }

    #[test]
    fn test_selection_parse_unknown_payload() {
        assert_eq!(Selection::parse("edit_3"), None);
        assert_eq!(Selection::parse("bogus:x"), None);
    }

    #[test]
    fn test_compose_reply_without_records_is_verbatim() {
        let reply = compose_reply("خط اول\nخط دوم", "ناشناس", "", "", &[]);
        assert_eq!(reply, "خط اول\nخط دوم");
    }

    #[test]
    fn test_compose_reply_with_records() {
        let records = vec![
            ReferenceRecord {
                time: Some("8:20 دقیقه".to_string()),
                temperature: Some("240 درجه".to_string()),
            },
            ReferenceRecord {
                time: Some("9:20".to_string()),
                temperature: Some("240 درجه".to_string()),
            },
        ];
        let reply = compose_reply("خط اول\nخط دوم", "پلنت", "پپرونی", "ونک", &records);
        assert_eq!(
            reply,
            "خط اول\nخط دوم\n———\nمرجع: پلنت | پپرونی | ونک\n• 240 درجه | 8:20 دقیقه\n• 240 درجه | 9:20"
        );
    }

    #[test]
    fn test_compose_reply_header_omits_skipped_steps() {
        let records = vec![ReferenceRecord {
            time: None,
            temperature: Some("230 درجه".to_string()),
        }];
        let reply = compose_reply("حکم", "پلنت", "", "", &records);
        assert!(reply.contains("مرجع: پلنت\n"));
        assert!(reply.ends_with("• 230 درجه"));
    }

    #[test]
    fn test_item_menu_for_brand_without_catalog_is_single_skip() {
        let Outbound::Menu { rows, .. } = item_menu("برند ناشناخته") else {
            panic!("expected menu");
        };
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][0].payload, "item:");
    }

    #[test]
    fn test_item_menu_always_offers_skip() {
        let Outbound::Menu { rows, .. } = item_menu("پلنت") else {
            panic!("expected menu");
        };
        assert!(rows.len() > 1);
        assert_eq!(rows.last().unwrap()[0].payload, "item:");
    }

    #[test]
    fn test_branch_menu_offers_all_branches_and_skip() {
        let Outbound::Menu { rows, .. } = branch_menu() else {
            panic!("expected menu");
        };
        assert_eq!(rows.len(), catalog::branches().len() + 1);
        assert_eq!(rows.last().unwrap()[0].payload, "branch:");
    }
}
