use http::{Request, Response, StatusCode};

use super::{with_content_type, TEXT_HTML, TEXT_PLAIN};
use crate::{Body, Handler, ServerState};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MetricsFormat {
    /// `Hits: {count}`
    Plain,
    /// Admin page saying how many times the site was visited.
    Html,
}

/// Reports the current hit count. Read-only.
#[derive(Clone, Debug)]
pub struct Metrics {
    state: ServerState,
    format: MetricsFormat,
}

impl Metrics {
    pub fn new(state: ServerState, format: MetricsFormat) -> Self {
        Self { state, format }
    }

    pub fn plain(state: ServerState) -> Self {
        Self::new(state, MetricsFormat::Plain)
    }

    pub fn html(state: ServerState) -> Self {
        Self::new(state, MetricsFormat::Html)
    }

    fn render(&self, hits: u64) -> String {
        match self.format {
            MetricsFormat::Plain => format!("Hits: {hits}"),
            MetricsFormat::Html => format!(
                "<html>\n\n<body>\n    <h1>Welcome, Chirpy Admin</h1>\n    <p>Chirpy has been visited {hits} times!</p>\n</body>\n\n</html>\n"
            ),
        }
    }
}

impl Handler for Metrics {
    fn handle(&self, _req: Request<Body>) -> Response<Body> {
        let content_type = match self.format {
            MetricsFormat::Plain => TEXT_PLAIN,
            MetricsFormat::Html => TEXT_HTML,
        };

        with_content_type(StatusCode::OK, content_type, self.render(self.state.hits()))
    }
}

#[cfg(test)]
mod tests {
    use http::header::CONTENT_TYPE;
    use indoc::indoc;

    use super::*;

    fn body(res: Response<Body>) -> String {
        String::from_utf8(res.into_body().into_bytes().unwrap()).unwrap()
    }

    #[test]
    fn renders_plain_text() {
        let state = ServerState::new();
        state.increment();
        state.increment();

        let res = Metrics::plain(state).handle(Request::new(Body::empty()));

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers()[CONTENT_TYPE], "text/plain; charset=utf-8");
        assert_eq!(body(res), "Hits: 2");
    }

    #[test]
    fn renders_the_admin_page() {
        let state = ServerState::new();
        for _ in 0..7 {
            state.increment();
        }

        let res = Metrics::html(state).handle(Request::new(Body::empty()));

        assert_eq!(res.headers()[CONTENT_TYPE], "text/html; charset=utf-8");
        assert_eq!(
            body(res),
            indoc! {"
                <html>

                <body>
                    <h1>Welcome, Chirpy Admin</h1>
                    <p>Chirpy has been visited 7 times!</p>
                </body>

                </html>
            "}
        );
    }

    #[test]
    fn does_not_count_itself() {
        let state = ServerState::new();
        let metrics = Metrics::plain(state.clone());

        metrics.handle(Request::new(Body::empty()));
        metrics.handle(Request::new(Body::empty()));

        assert_eq!(state.hits(), 0);
    }
}
