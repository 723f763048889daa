//! Parser for geocoding service `places` responses.
//!
//! [`GeocodeXmlParser`] turns a response buffer into [`GeoLocation`]s in a
//! single forward pass. The whole document succeeds or fails together:
//! structural faults abort with a [`GeocodeParseError`], while unusable
//! numeric leaves degrade to `NaN` and unknown elements are skipped.
//!
//! [`Dispatcher`] runs parses on tokio's blocking pool and delivers exactly
//! one [`GeocodeReply`] per submission.
//!
//! [`GeoLocation`]: geocode_core::GeoLocation

mod cursor;
pub mod error;
pub mod parser;
pub mod state;
pub mod worker;

pub use error::GeocodeParseError;
pub use parser::GeocodeXmlParser;
pub use state::ParseState;
pub use worker::{Dispatcher, GeocodeReply, GeocodeRequest};
