use console::Style;
use radioflux_core::flux::FluxRecord;
use radioflux_core::io::Card;

pub struct Styles {
    pub title: Style,
    pub label: Style,
    pub value: Style,
    pub error: Style,
}

impl Styles {
    pub fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold(),
            error: Style::new().red().bold(),
        }
    }
}

/// One line per channel: `file [label] frequency flux [error]`.
pub fn record_lines(record: &FluxRecord) -> Vec<String> {
    record
        .channels
        .iter()
        .map(|channel| {
            let mut fields = vec![record.file.display().to_string()];
            if let Some(label) = record.label {
                fields.push(label.to_string());
            }
            fields.push(format_g(channel.frequency));
            fields.push(channel.flux.to_string());
            if let Some(error) = channel.error {
                fields.push(error.to_string());
            }
            fields.join(" ")
        })
        .collect()
}

/// Header card in `fitsheader` layout.
pub fn card_line(card: &Card) -> String {
    let text = card.text.as_deref().unwrap_or("");
    match card.value {
        _ if card.is_commentary() => format!("{:<8}{}", card.keyword, text),
        Some(ref value) if !text.is_empty() => {
            format!("{:<8}= {:<20} / {}", card.keyword, value, text)
        }
        Some(ref value) => format!("{:<8}= {}", card.keyword, value),
        None => format!("{:<8}= {}", card.keyword, text),
    }
}

/// printf-style `%g`: six significant digits, scientific outside
/// 1e-4..1e6, trailing zeros removed.
pub fn format_g(v: f64) -> String {
    if v == 0.0 {
        return "0".into();
    }
    if !v.is_finite() {
        return v.to_string();
    }
    let sci = format!("{:.5e}", v);
    let (mantissa, exp) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => return sci,
    };
    if !(-4..6).contains(&exp) {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_zeros(mantissa), sign, exp.abs())
    } else {
        let decimals = (5 - exp).max(0) as usize;
        trim_zeros(&format!("{:.*}", decimals, v)).to_string()
    }
}

fn trim_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}
