//! Shared page layout, styles and formatting helpers for the server-rendered pages.

use std::sync::OnceLock;

use maud::{DOCTYPE, Markup, PreEscaped, html};
use numfmt::{Formatter, Precision};

use crate::money::Money;

// Form styles
pub const FORM_LABEL_STYLE: &str = "block mb-2 text-sm font-medium text-gray-900";
pub const FORM_TEXT_INPUT_STYLE: &str = "block w-full p-2.5 rounded text-sm \
    text-gray-900 bg-gray-50 border border-gray-300";

pub const BUTTON_PRIMARY_STYLE: &str = "w-full px-4 py-2 bg-blue-600 text-white rounded";

// Card styles
pub const CARD_STYLE: &str = "p-6 bg-white rounded-lg shadow border border-gray-200";
pub const CARD_TITLE_STYLE: &str = "text-sm font-medium text-gray-500";
pub const CARD_VALUE_STYLE: &str = "text-3xl font-bold mt-2";

// Page container
pub const PAGE_CONTAINER_STYLE: &str =
    "flex flex-col items-center px-6 py-8 mx-auto lg:py-5 text-gray-900";

const BASE_STYLE: &str = r#"
    body { font-family: system-ui, sans-serif; margin: 0; background: #f9fafb; }
    .grid { display: grid; gap: 1rem; grid-template-columns: repeat(auto-fit, minmax(14rem, 1fr)); width: 100%; max-width: 72rem; }
    .text-green-600 { color: #16a34a; }
    .text-red-600 { color: #dc2626; }
    .text-amber-600 { color: #d97706; }
    .text-blue-600 { color: #2563eb; }
"#;

pub fn base(title: &str, content: &Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="pt-BR"
        {
            head
            {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) " - Financeiro Escolar" }
                style { (PreEscaped(BASE_STYLE)) }
            }

            body class="container max-w-full min-h-screen"
            {
                (content)
            }
        }
    }
}

pub fn error_view(title: &str, header: &str, description: &str, fix: &str) -> Markup {
    let content = html!(
        section class="py-8 px-4 mx-auto max-w-screen-sm text-center"
        {
            h1 class="mb-4 text-7xl font-extrabold text-blue-600" { (header) }
            p class="mb-4 text-3xl font-bold" { (description) }
            p class="mb-4 text-2xl" { (fix) }
            a href="/" class="inline-flex text-white bg-blue-600 rounded text-sm px-5 py-2.5"
            {
                "Voltar ao início"
            }
        }
    );

    base(title, &content)
}

/// The centred card layout used by the log in page.
pub fn log_in_layout(form_title: &str, form: &Markup) -> Markup {
    html! {
        div class="flex flex-col items-center justify-center px-6 py-8 mx-auto"
        {
            p class="mb-6 text-2xl font-semibold" { "Financeiro Escolar" }

            div class=(CARD_STYLE)
            {
                h1 class="text-xl font-bold leading-tight" { (form_title) }

                (form)
            }
        }
    }
}

/// Format `amount` as Brazilian reais, e.g. "R$1,234.56" or "-R$12.34".
pub fn format_currency(amount: Money) -> String {
    static POSITIVE_FMT: OnceLock<Option<Formatter>> = OnceLock::new();
    static NEGATIVE_FMT: OnceLock<Option<Formatter>> = OnceLock::new();

    let make_formatter = |prefix: &str| {
        Formatter::currency(prefix)
            .map(|formatter| formatter.precision(Precision::Decimals(2)))
            .ok()
    };

    let number = amount.to_f64();
    let formatted = if number < 0.0 {
        NEGATIVE_FMT
            .get_or_init(|| make_formatter("-R$"))
            .as_ref()
            .map(|formatter| formatter.fmt_string(number.abs()))
    } else if number > 0.0 {
        POSITIVE_FMT
            .get_or_init(|| make_formatter("R$"))
            .as_ref()
            .map(|formatter| formatter.fmt_string(number))
    } else {
        // numfmt formats zero as "0".
        return "R$0.00".to_owned();
    };

    let Some(mut formatted) = formatted else {
        return format!("R${:.2}", amount.as_decimal());
    };

    // numfmt drops trailing zeros, e.g. "12.30" is rendered as "12.3".
    match formatted.find('.') {
        None => formatted.push_str(".00"),
        Some(point) if formatted.len() - point == 2 => formatted.push('0'),
        Some(_) => {}
    }

    formatted
}
