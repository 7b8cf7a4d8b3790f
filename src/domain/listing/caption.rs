//! Pure caption rendering.
//!
//! All user-supplied values are HTML-escaped; the transport sends every
//! message with the HTML parse mode.

use serde::{Deserialize, Serialize};

use super::form::ListingForm;
use super::text::{escape_html, to_persian_digits, truncate_chars};

/// Description preview length on moderator panels.
pub const PANEL_DESCRIPTION_PREVIEW: usize = 400;

/// Text shown on a panel once its draft was approved.
pub const PANEL_APPLIED_TEXT: &str = "✅ اعمال شد روی پست گروه";

/// Text shown on a panel once its draft was rejected.
pub const PANEL_REJECTED_TEXT: &str = "❌ این آگهی توسط ادمین رد شد.";

/// Text shown on a panel delivered after its draft was already finalized.
pub const PANEL_SETTLED_TEXT: &str = "⌛ این آگهی پیش از رسیدن این پیام بررسی شد.";

/// Replaces a published post that could not be deleted on rejection.
pub const WITHDRAWN_POST_TEXT: &str = "⛔ این آگهی توسط مدیریت حذف شد.";

const PLACEHOLDER: &str = "—";
const RULE: &str = "───────────────────";

/// Sequence number and display date assigned at first publication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingStamp {
    pub number: u64,
    pub display_date: String,
}

/// Which optional fields the public caption may show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Reveal {
    pub price: bool,
    pub description: bool,
}

impl Reveal {
    pub fn new(price: bool, description: bool) -> Self {
        Self { price, description }
    }
}

/// Contact line printed under public listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicContact {
    pub name: Option<String>,
    pub phone: String,
}

fn insurance_text(form: &ListingForm) -> String {
    form.insurance_months()
        .map(|m| format!("{} ماه", m))
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

fn or_placeholder(s: &str) -> String {
    if s.trim().is_empty() {
        PLACEHOLDER.to_string()
    } else {
        escape_html(s)
    }
}

/// Renders the caption posted to the public channel.
///
/// Price and description appear only when revealed *and* non-empty; every
/// other field is always shown. Without a configured desk contact the
/// submitter's own phone is printed.
pub fn render_public_caption(
    form: &ListingForm,
    stamp: &ListingStamp,
    reveal: Reveal,
    contact: Option<&PublicContact>,
) -> String {
    let mut lines = vec![
        format!("🏷 <b>{}</b>", escape_html(form.category())),
        escape_html(form.vehicle_name()),
        format!("\u{200F}{}\u{200F}", to_persian_digits(&form.year().to_string())),
        escape_html(form.color()),
    ];

    let price_words = form.price_words();
    if reveal.price && !price_words.is_empty() {
        lines.push(format!("قیمت: {}", escape_html(&price_words)));
    }

    lines.push(format!("کارکرد: {} کیلومتر", form.mileage_km()));
    lines.push(format!("مهلت بیمه: {}", escape_html(&insurance_text(form))));
    lines.push(format!("گیربکس: {}", or_placeholder(form.transmission())));

    if reveal.description && !form.description().trim().is_empty() {
        lines.push(String::new());
        lines.push("<b>توضیحات:</b>".to_string());
        lines.push(escape_html(form.description()));
    }

    lines.push(String::new());
    lines.push("☎️ <b>تماس:</b>".to_string());
    lines.push(match contact {
        Some(PublicContact {
            name: Some(name),
            phone,
        }) => format!(
            "{} - \u{200E}{}\u{200E}",
            escape_html(name),
            escape_html(phone)
        ),
        Some(PublicContact { name: None, phone }) => {
            format!("\u{200E}{}\u{200E}", escape_html(phone))
        }
        None => format!("\u{200E}{}\u{200E}", escape_html(form.contact_phone())),
    });

    lines.push(RULE.to_string());
    lines.push(format!("🔖 <b>آگهی شماره #{}</b>", stamp.number));
    lines.push(format!("📅 <i>{}</i>", escape_html(&stamp.display_date)));

    lines.join("\n")
}

/// Renders the review caption sent to moderators.
///
/// Always exposes the submitter's contact, both reviewable fields and a
/// read-only summary of the rest.
pub fn render_moderator_caption(form: &ListingForm, stamp: &ListingStamp) -> String {
    let mut lines = vec![format!("📞 {}", or_placeholder(form.contact_phone()))];
    lines.push(match form.submitter_handle() {
        Some(handle) => format!("👤 @{}", escape_html(handle)),
        None => "👤 بدون نام کاربری".to_string(),
    });
    lines.push(String::new());

    lines.push("🧪 <b>موارد نیازمند بررسی:</b>".to_string());
    lines.push(format!("💵 قیمت: {}", or_placeholder(&form.price_words())));
    lines.push(format!("📝 توضیحات:\n{}", or_placeholder(form.description())));
    lines.push(PLACEHOLDER.repeat(10));

    lines.push("📋 <b>خلاصه آگهی</b>".to_string());
    lines.push(format!("دسته: {}", or_placeholder(form.category())));
    lines.push(format!("نام خودرو: {}", escape_html(form.vehicle_name())));
    lines.push(format!(
        "سال/رنگ/کارکرد: {} / {} / {}km",
        form.year(),
        escape_html(form.color()),
        form.mileage_km()
    ));
    lines.push(format!(
        "بیمه/گیربکس: {} / {}",
        escape_html(&insurance_text(form)),
        or_placeholder(form.transmission())
    ));
    lines.push(format!(
        "\n🗓️ <i>{}</i> • ⏱ #{}",
        escape_html(&stamp.display_date),
        stamp.number
    ));

    lines.join("\n")
}

/// Renders the body of a moderator's action panel.
pub fn render_panel_text(form: &ListingForm) -> String {
    let description = truncate_chars(form.description(), PANEL_DESCRIPTION_PREVIEW);
    format!(
        "📝 ویرایش/اعمال:\n• قیمت فعلی: {}\n• توضیحات فعلی: {}\n",
        or_placeholder(&form.price_words()),
        or_placeholder(description)
    )
}
