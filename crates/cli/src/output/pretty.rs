//! Pretty output formatting.

use super::{RouteRow, SynthSummary};

/// Format the routing table for display.
pub fn format_routes(routes: &[RouteRow]) -> String {
    if routes.is_empty() {
        return "No routes found.".to_string();
    }
    let method_width = routes.iter().map(|r| r.method.len()).max().unwrap_or(0);
    let path_width = routes.iter().map(|r| r.path.len()).max().unwrap_or(0);

    let mut output = format!("ROUTES ({})\n", routes.len());
    output.push_str(&"-".repeat(40));
    for route in routes {
        output.push_str(&format!(
            "\n{:<mw$}  {:<pw$}  -> {}",
            route.method,
            route.path,
            route.target,
            mw = method_width,
            pw = path_width
        ));
    }
    output
}

/// Format a synth summary for display.
pub fn format_synth_summary(summary: &SynthSummary) -> String {
    format!(
        "{}\n  Template: {}\n  Assets: {}\n  Resources: {}\n  Parameters: {}\n  Outputs: {}",
        summary.stack_name,
        summary.template_path.display(),
        summary.asset_manifest_path.display(),
        summary.resources,
        summary.parameters,
        summary.outputs
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(method: &str, path: &str, target: &str) -> RouteRow {
        RouteRow {
            method: method.to_string(),
            path: path.to_string(),
            target: target.to_string(),
        }
    }

    #[test]
    fn test_format_routes_aligns_columns() {
        let output = format_routes(&[
            row("GET", "/trips", "GetTripsHandler"),
            row("OPTIONS", "/trips", "MOCK"),
            row("GET", "/trips/{id}", "GetTripDetailsHandler"),
        ]);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "ROUTES (3)");
        assert_eq!(lines[2], "GET      /trips       -> GetTripsHandler");
        assert_eq!(lines[3], "OPTIONS  /trips       -> MOCK");
        assert_eq!(lines[4], "GET      /trips/{id}  -> GetTripDetailsHandler");
    }

    #[test]
    fn test_format_no_routes() {
        assert_eq!(format_routes(&[]), "No routes found.");
    }
}
