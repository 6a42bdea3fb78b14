use serde_json::Value;

use crate::paths::Resolution;
use crate::snapshot::ProjectSnapshot;

/// Locale-aware rendering of resolved values into finding text. The
/// defaults follow pt-PT conventions; callers with other locales build
/// their own formatter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueFormatter {
    pub yes: String,
    pub no: String,
    pub thousands_separator: char,
    pub decimal_separator: char,
    pub absent: String,
}

impl Default for ValueFormatter {
    fn default() -> Self {
        ValueFormatter {
            yes: "Sim".to_string(),
            no: "Não".to_string(),
            thousands_separator: '.',
            decimal_separator: ',',
            absent: "—".to_string(),
        }
    }
}

impl ValueFormatter {
    pub fn format_value(&self, value: &Value) -> String {
        match value {
            Value::Null => self.absent.clone(),
            Value::Bool(true) => self.yes.clone(),
            Value::Bool(false) => self.no.clone(),
            Value::Number(n) => self.format_number(&n.to_string()),
            Value::String(s) => s.clone(),
            Value::Array(items) => {
                let rendered: Vec<String> =
                    items.iter().map(|item| self.format_value(item)).collect();
                format!("[{}]", rendered.join(", "))
            }
            Value::Object(_) => serde_json::to_string(value).unwrap_or_else(|_| self.absent.clone()),
        }
    }

    fn format_number(&self, raw: &str) -> String {
        // Exponent forms pass through untouched.
        if raw.contains(['e', 'E']) {
            return raw.to_string();
        }
        let (sign, rest) = match raw.strip_prefix('-') {
            Some(rest) => ("-", rest),
            None => ("", raw),
        };
        let (int_part, frac_part) = match rest.split_once('.') {
            Some((int_part, frac_part)) => (int_part, Some(frac_part)),
            None => (rest, None),
        };

        let digits: Vec<u8> = int_part.bytes().collect();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 4);
        grouped.push_str(sign);
        for (i, b) in digits.iter().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(self.thousands_separator);
            }
            grouped.push(*b as char);
        }
        if let Some(frac) = frac_part {
            grouped.push(self.decimal_separator);
            grouped.push_str(frac);
        }
        grouped
    }
}

/// Substitute every `{field.path}` placeholder in `template` with the
/// resolved, formatted snapshot value. Unresolved placeholders render as
/// the formatter's absent marker; interpolation never fails.
pub fn interpolate(
    template: &str,
    snapshot: &ProjectSnapshot<'_>,
    formatter: &ValueFormatter,
) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after_open = &rest[open + 1..];
        match after_open.find('}') {
            Some(close) => {
                let path = &after_open[..close];
                match snapshot.resolve(path) {
                    Resolution::Found(value) => out.push_str(&formatter.format_value(value)),
                    Resolution::NotFound => out.push_str(&formatter.absent),
                }
                rest = &after_open[close + 1..];
            }
            None => {
                // Unterminated brace: keep the remainder verbatim.
                out.push_str(&rest[open..]);
                return out;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(template: &str, project: serde_json::Value) -> String {
        let computed = json!({});
        let snapshot = ProjectSnapshot::new(&project, &computed);
        interpolate(template, &snapshot, &ValueFormatter::default())
    }

    #[test]
    fn substitutes_resolved_fields() {
        let project = json!({ "electrical": { "rcdSensitivity": 30 } });
        assert_eq!(
            render("Sensibilidade diferencial de {electrical.rcdSensitivity} mA", project),
            "Sensibilidade diferencial de 30 mA"
        );
    }

    #[test]
    fn unresolved_placeholders_render_as_em_dash() {
        assert_eq!(render("Valor: {missing.field}", json!({})), "Valor: —");
    }

    #[test]
    fn booleans_render_localized() {
        let project = json!({ "hvac": { "present": true, "ducted": false } });
        assert_eq!(
            render("AVAC: {hvac.present} / Condutas: {hvac.ducted}", project),
            "AVAC: Sim / Condutas: Não"
        );
    }

    #[test]
    fn numbers_render_with_locale_grouping() {
        let project = json!({ "area": 1234567, "ratio": 0.35, "power": 10.35 });
        assert_eq!(render("{area}", project.clone()), "1.234.567");
        assert_eq!(render("{ratio}", project.clone()), "0,35");
        assert_eq!(render("{power}", project.clone()), "10,35");
        assert_eq!(render("{area} m2 em {power} kVA", project), "1.234.567 m2 em 10,35 kVA");
    }

    #[test]
    fn negative_numbers_keep_their_sign_outside_grouping() {
        let project = json!({ "delta": -12345 });
        assert_eq!(render("{delta}", project), "-12.345");
    }

    #[test]
    fn arrays_render_as_bracketed_lists() {
        let project = json!({ "zones": ["urban", "coastal"], "mixed": [1000, true] });
        assert_eq!(render("{zones}", project.clone()), "[urban, coastal]");
        assert_eq!(render("{mixed}", project), "[1.000, Sim]");
    }

    #[test]
    fn unterminated_braces_are_kept_verbatim() {
        let project = json!({ "a": 1 });
        assert_eq!(render("incomplete {a", project), "incomplete {a");
    }
}
