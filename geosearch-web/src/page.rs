//! The HTML search page.

use actix_web::{http::StatusCode, HttpResponse};
use geosearch_places::{PlaceRecord, SearchError, SearchResult};

/// Why a search didn't produce places, beyond there being no matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// Nothing was typed in the form.
    EmptyQuery,
    /// The geocoding service didn't answer in time.
    Timeout,
    /// The geocoding service failed or answered with garbage.
    Unavailable,
}

impl Failure {
    /// The status code the page is served with.
    pub fn status_code(self) -> StatusCode {
        match self {
            Self::EmptyQuery => StatusCode::BAD_REQUEST,
            Self::Timeout => StatusCode::GATEWAY_TIMEOUT,
            Self::Unavailable => StatusCode::BAD_GATEWAY,
        }
    }

    /// The message shown to the user.
    fn message(self) -> &'static str {
        match self {
            Self::EmptyQuery => "Type the name of a place to search for it.",
            Self::Timeout => "The geocoding service took too long to answer. Try again later.",
            Self::Unavailable => "The geocoding service is unavailable right now. Try again later.",
        }
    }
}

impl From<&SearchError> for Failure {
    fn from(error: &SearchError) -> Self {
        match error {
            SearchError::EmptyQuery => Self::EmptyQuery,
            SearchError::NetworkTimeout => Self::Timeout,
            SearchError::Upstream(_) => Self::Unavailable,
        }
    }
}

/// Everything needed to draw the search page.
#[derive(Debug)]
pub struct SearchPage<'a> {
    /// The text that was searched for, echoed back into the form.
    pub query: &'a str,
    /// The places found, or a marker for why there are none.
    pub results: SearchResult,
    /// Set when the search could not be completed.
    pub failure: Option<Failure>,
}

impl<'a> SearchPage<'a> {
    /// The page shown before the form is submitted.
    pub fn empty() -> Self {
        Self {
            query: "",
            results: SearchResult::NotSubmitted,
            failure: None,
        }
    }

    /// Build an HTTP response showing this page.
    pub fn respond(&self) -> HttpResponse {
        let status = self.failure.map_or(StatusCode::OK, Failure::status_code);
        HttpResponse::build(status)
            .content_type("text/html; charset=utf-8")
            .body(self.render())
    }

    /// Render the page as a complete HTML document.
    pub fn render(&self) -> String {
        let mut html = String::with_capacity(2048);
        html.push_str(concat!(
            "<!DOCTYPE html>\n",
            "<html lang=\"en\">\n",
            "<head>\n",
            "<meta charset=\"utf-8\">\n",
            "<title>Geosearch</title>\n",
            "</head>\n",
            "<body>\n",
            "<h1>Find a place</h1>\n",
            "<form method=\"post\" action=\"/\">\n",
        ));
        html.push_str(&format!(
            "<input type=\"text\" name=\"lugar\" value=\"{}\" placeholder=\"Paris\" autofocus>\n",
            escape(self.query)
        ));
        html.push_str("<button type=\"submit\">Search</button>\n</form>\n");

        match (&self.failure, &self.results) {
            (Some(failure), _) => {
                html.push_str(&format!("<p class=\"error\">{}</p>\n", failure.message()));
            }
            (None, SearchResult::NotSubmitted) => {}
            (None, SearchResult::NoMatches) => {
                html.push_str(&format!(
                    "<p class=\"no-results\">No places found for \u{201c}{}\u{201d}.</p>\n",
                    escape(self.query)
                ));
            }
            (None, SearchResult::Places(places)) => {
                html.push_str("<ol class=\"places\">\n");
                for place in places {
                    html.push_str(&render_place(place));
                }
                html.push_str("</ol>\n");
            }
        }

        html.push_str("</body>\n</html>\n");
        html
    }
}

/// Render one place as a list item linking to OpenStreetMap.
fn render_place(place: &PlaceRecord) -> String {
    format!(
        "<li><a href=\"https://www.openstreetmap.org/?mlat={lat}&amp;mlon={lon}#map=14/{lat}/{lon}\">{label}</a> \
         <span class=\"coordinates\">{lat}, {lon}</span></li>\n",
        lat = escape(&place.latitude),
        lon = escape(&place.longitude),
        label = escape(&place.label),
    )
}

/// Escape text for use in HTML element content and quoted attribute values.
fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::{escape, render_place, Failure, SearchPage};
    use actix_web::http::StatusCode;
    use geosearch_places::{PlaceRecord, SearchResult};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
        assert_eq!(escape("São Paulo"), "São Paulo");
    }

    #[test]
    fn test_empty_page_has_only_the_form() {
        let html = SearchPage::empty().render();
        assert!(html.contains("name=\"lugar\" value=\"\""));
        assert!(!html.contains("class=\"places\""));
        assert!(!html.contains("class=\"error\""));
        assert!(!html.contains("class=\"no-results\""));
    }

    #[test]
    fn test_places_render_in_order() {
        let page = SearchPage {
            query: "Springfield",
            results: SearchResult::Places(vec![
                PlaceRecord {
                    latitude: "39.80".into(),
                    longitude: "-89.64".into(),
                    label: "Springfield, Illinois".into(),
                },
                PlaceRecord {
                    latitude: "37.21".into(),
                    longitude: "-93.29".into(),
                    label: "Springfield, Missouri".into(),
                },
            ]),
            failure: None,
        };
        let html = page.render();
        let illinois = html.find("Springfield, Illinois").expect("first place");
        let missouri = html.find("Springfield, Missouri").expect("second place");
        assert!(illinois < missouri);
        assert!(html.contains("mlat=39.80&amp;mlon=-89.64"));
        assert!(html.contains("<span class=\"coordinates\">37.21, -93.29</span>"));
    }

    #[test]
    fn test_no_matches_is_not_an_error() {
        let page = SearchPage {
            query: "zzzznotaplace",
            results: SearchResult::NoMatches,
            failure: None,
        };
        let html = page.render();
        assert!(html.contains("No places found for \u{201c}zzzznotaplace\u{201d}."));
        assert!(!html.contains("class=\"error\""));
        assert_eq!(page.respond().status(), StatusCode::OK);
    }

    #[test]
    fn test_failures_have_their_own_message_and_status() {
        for (failure, status) in [
            (Failure::EmptyQuery, StatusCode::BAD_REQUEST),
            (Failure::Timeout, StatusCode::GATEWAY_TIMEOUT),
            (Failure::Unavailable, StatusCode::BAD_GATEWAY),
        ] {
            let page = SearchPage {
                query: "Paris",
                results: SearchResult::NoMatches,
                failure: Some(failure),
            };
            let html = page.render();
            assert!(html.contains(failure.message()));
            assert!(!html.contains("No places found"));
            assert_eq!(page.respond().status(), status);
        }
    }

    #[test]
    fn test_place_is_one_line() {
        let place = PlaceRecord {
            latitude: "-12.04".into(),
            longitude: "-77.04".into(),
            label: "Lima & Callao".into(),
        };
        assert_eq!(
            render_place(&place),
            "<li><a href=\"https://www.openstreetmap.org/?mlat=-12.04&amp;mlon=-77.04#map=14/-12.04/-77.04\">\
             Lima &amp; Callao</a> <span class=\"coordinates\">-12.04, -77.04</span></li>\n"
        );
    }

    #[test]
    fn test_page_fragments_end_lines() {
        let page = SearchPage {
            query: "Paris",
            results: SearchResult::NoMatches,
            failure: Some(Failure::Timeout),
        };
        let html = page.render();
        assert!(html.contains("placeholder=\"Paris\" autofocus>\n<button"));
        assert!(html.contains(&format!("<p class=\"error\">{}</p>\n</body>", Failure::Timeout.message())));
        assert!(html.ends_with("</body>\n</html>\n"));
    }

    #[test]
    fn test_query_is_escaped() {
        let page = SearchPage {
            query: "\"><script>alert(1)</script>",
            results: SearchResult::NoMatches,
            failure: None,
        };
        let html = page.render();
        assert!(!html.contains("<script>"));
        assert!(html.contains("value=\"&quot;&gt;&lt;script&gt;"));
    }
}
