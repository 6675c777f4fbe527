//! Geocoder implementations and combinators.

mod fixed;
mod nominatim;
mod timeout;

pub use self::fixed::FixedGeocoder;
pub use self::nominatim::NominatimGeocoder;
pub use self::timeout::TimeoutGeocoder;
