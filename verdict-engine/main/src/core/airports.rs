use std::collections::HashMap;

use serde::Deserialize;

use crate::spi::traits::AirportDirectory;

const DEFAULT_AIRPORTS: &str = include_str!("../airports.toml");

#[derive(Deserialize)]
struct AirportsToml {
    airports: HashMap<String, String>,
}

/// Static IATA → ISO country table covering the airports the advisor
/// commonly sees. Unknown codes resolve to `None`, which makes the route
/// type unknown and matches only unconditional rules.
pub struct EmbeddedAirports {
    map: HashMap<String, String>,
}

impl EmbeddedAirports {
    pub fn new() -> Self {
        let parsed: AirportsToml =
            toml::from_str(DEFAULT_AIRPORTS).expect("embedded airport table must be valid");
        Self {
            map: parsed.airports,
        }
    }
}

impl Default for EmbeddedAirports {
    fn default() -> Self {
        Self::new()
    }
}

impl AirportDirectory for EmbeddedAirports {
    fn country(&self, iata: &str) -> Option<String> {
        self.map.get(&iata.to_uppercase()).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_airports_resolve() {
        let airports = EmbeddedAirports::new();
        assert_eq!(airports.country("ICN").as_deref(), Some("KR"));
        assert_eq!(airports.country("lax").as_deref(), Some("US"));
        assert_eq!(airports.country("XXX"), None);
    }
}
