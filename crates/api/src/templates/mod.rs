use maud::{html, Markup, DOCTYPE};

/// Landing page listing the available routes.
pub fn home_page(api_base: &str) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                title { "Climate Analysis API" }
            }
            body {
                h1 { "Welcome to the Climate Analysis API!" }
                p { "Available Routes:" }
                ul {
                    li {
                        "Precipitation: "
                        a href={ (api_base) "/api/v1.0/precipitation" } { "/api/v1.0/precipitation" }
                    }
                    li {
                        "Station list: "
                        a href={ (api_base) "/api/v1.0/stations" } { "/api/v1.0/stations" }
                    }
                    li {
                        "Temperature for previous year: "
                        a href={ (api_base) "/api/v1.0/tobs" } { "/api/v1.0/tobs" }
                    }
                    li { "Temp stats from start date (yyyy-mm-dd): /api/v1.0/yyyy-mm-dd" }
                    li { "Temp stats from start to end date (yyyy-mm-dd): /api/v1.0/yyyy-mm-dd/yyyy-mm-dd" }
                }
                p {
                    a href={ (api_base) "/docs" } { "API Docs" }
                }
            }
        }
    }
}
