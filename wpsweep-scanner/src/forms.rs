use scraper::{Html, Selector};
use std::sync::LazyLock;

static FORM_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("form").expect("static selector"));
static INPUT_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("input[type]").expect("static selector"));

/// Returns true if any `<form>` in `html` contains an `<input type="text">`.
///
/// html5ever recovers from malformed markup, so this never fails; a document
/// without forms is simply `false`. Inputs with no `type` attribute are not
/// counted.
pub fn has_text_input_form(html: &str) -> bool {
    let document = Html::parse_document(html);

    document.select(&FORM_SELECTOR).any(|form| {
        form.select(&INPUT_SELECTOR).any(|input| {
            input
                .value()
                .attr("type")
                .is_some_and(|t| t.trim().eq_ignore_ascii_case("text"))
        })
    })
}
