//! Fixed Persian user-facing strings.
//!
//! The bot speaks Persian only, so the strings live here as constants
//! instead of going through a localization layer.

pub const GREETING: &str = "سلام! یک عکس پیتزا بفرست تا کیفیت پخت را بررسی کنم.\n\
بعد از عکس، برند و محصول و شعبه را از دکمه‌ها انتخاب کن.";

pub const GENERIC_INSTRUCTION: &str =
    "برای بهترین نتیجه: اول عکس پیتزا را بفرست، بعد برند و محصول و شعبه را از دکمه‌ها انتخاب کن.";

pub const SEND_PHOTO_FIRST: &str = "⚠️ اول یک عکس پیتزا بفرست، بعد شعبه را انتخاب کن.";

pub const PROCESSING_FAILED: &str = "⚠️ خطا در پردازش. لطفاً دوباره تلاش کن.";

pub const NO_RESULT: &str = "نتیجه‌ای دریافت نشد.";

pub const CHOOSE_BRAND: &str = "برند را انتخاب کن:";
pub const CHOOSE_ITEM: &str = "محصول را انتخاب کن:";
pub const CHOOSE_BRANCH: &str = "شعبه را انتخاب کن:";
pub const SKIP: &str = "رد کردن";

pub const REFERENCE_USAGE: &str =
    "برای به‌روزرسانی مرجع، بعد از /reference هر برند را در یک خط بنویس:\n\
پلنت 8:20 دقیقه 240 درجه";

pub const REFERENCE_UPDATED: &str = "مرجع به‌روز شد.";

/// Separator between the analysis verdict and the reference block.
pub const REFERENCE_SEPARATOR: &str = "———";
