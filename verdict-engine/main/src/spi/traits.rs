/// Resolves airport codes to ISO country codes.
///
/// Route type inference only needs the country of each airport on the
/// itinerary; the full airport directory is an external collaborator.
/// The engine ships [`crate::EmbeddedAirports`] with a small static
/// table, and callers with a real directory substitute their own.
pub trait AirportDirectory: Send + Sync {
    /// ISO 3166-1 alpha-2 country code for a three-letter airport code.
    fn country(&self, iata: &str) -> Option<String>;
}
