//! # reqkit-query
//!
//! Query-string parameters for reqkit.
//!
//! Parameters are an insertion-ordered map from name to either a single
//! value or a list of values. Scalars are stringified when they enter the
//! map, so serialization only ever deals with strings.
//!
//! ```rust
//! use reqkit_query::{serialize, parse, Params};
//!
//! let params = Params::new().with("a", 1).with("b", vec![1, 2]);
//! let query = serialize(&params);
//! assert_eq!(query, "a=1&b=1&b=2");
//!
//! let parsed = parse(&query);
//! assert_eq!(parsed.get("b").unwrap().values(), ["1", "2"]);
//! ```

mod error;
mod params;
mod serializer;

pub use error::Error;
pub use params::{ParamValue, Params};
pub use serializer::{parse, serialize, Brackets, QuerySerializer, RepeatedKeys};
