//! HTML rendering for the diagnosis form

/// Message shown under the form after a submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Diagnosis text from the expert system
    Success(String),
    /// Raw error detail from a failed run
    Failure(String),
}

/// Heading shown above raw error detail
pub const ERROR_HEADING: &str = "Rule engine error occurred";

const STYLE: &str = "body{font-family:sans-serif;max-width:40rem;margin:2rem auto;padding:0 1rem}\
fieldset{border:none;padding:0;margin:1rem 0}\
.success{background:#e6f4ea;border-left:4px solid #34a853;padding:.75rem}\
.error{background:#fce8e6;border-left:4px solid #ea4335;padding:.75rem}\
pre{white-space:pre-wrap}";

/// Escape text for inclusion in HTML content or attribute values
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Render the full page with the given answers preselected
pub fn render(has_fever: bool, has_cough: bool, notice: Option<&Notice>) -> String {
    let mut html = String::new();

    html.push_str(&format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>COVID-19 Diagnosis Expert System</title>\n<style>{}</style>\n</head>\n<body>\n\
         <h1>COVID-19 Diagnosis Expert System</h1>\n\
         <p>Simple rule-based diagnosis. Educational only.</p>\n\
         <form method=\"post\" action=\"/diagnose\">\n",
        STYLE
    ));
    question(&mut html, "fever", "Do you have a fever?", has_fever);
    question(&mut html, "cough", "Do you have a cough?", has_cough);
    html.push_str("<button type=\"submit\">Diagnose</button>\n</form>\n");

    match notice {
        Some(Notice::Success(text)) => {
            html.push_str(&format!(
                "<div class=\"success\">{}</div>\n",
                escape_html(text)
            ));
        }
        Some(Notice::Failure(detail)) => {
            html.push_str(&format!(
                "<div class=\"error\"><strong>{}</strong><pre>{}</pre></div>\n",
                ERROR_HEADING,
                escape_html(detail)
            ));
        }
        None => {}
    }

    html.push_str("</body>\n</html>\n");
    html
}

fn question(html: &mut String, field: &str, label: &str, yes: bool) {
    let checked = |on: bool| if on { " checked" } else { "" };
    html.push_str(&format!(
        "<fieldset>\n<legend>{label}</legend>\n\
         <label><input type=\"radio\" name=\"{field}\" value=\"no\"{no_checked}> No</label>\n\
         <label><input type=\"radio\" name=\"{field}\" value=\"yes\"{yes_checked}> Yes</label>\n\
         </fieldset>\n",
        label = label,
        field = field,
        no_checked = checked(!yes),
        yes_checked = checked(yes),
    ));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<b>\"a\" & 'b'</b>"),
            "&lt;b&gt;&quot;a&quot; &amp; &#39;b&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_defaults_to_no() {
        let html = render(false, false, None);
        assert!(html.contains("name=\"fever\" value=\"no\" checked"));
        assert!(html.contains("name=\"cough\" value=\"no\" checked"));
        assert!(!html.contains("value=\"yes\" checked"));
        assert!(!html.contains("class=\"success\""));
    }

    #[test]
    fn test_keeps_answers() {
        let html = render(true, false, None);
        assert!(html.contains("name=\"fever\" value=\"yes\" checked"));
        assert!(html.contains("name=\"cough\" value=\"no\" checked"));
    }

    #[test]
    fn test_failure_detail_is_escaped() {
        let notice = Notice::Failure("Unknown template: <script>".to_string());
        let html = render(false, false, Some(&notice));
        assert!(html.contains(ERROR_HEADING));
        assert!(html.contains("Unknown template: &lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_success_notice() {
        let notice = Notice::Success("All clear".to_string());
        let html = render(false, false, Some(&notice));
        assert!(html.contains("<div class=\"success\">All clear</div>"));
    }
}
