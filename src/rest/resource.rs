//! The resource trait.
//!
//! A resource is a typed entity of the API (participant, position, period,
//! ...). Implementors describe their wire payload with a static [`Schema`]
//! and gain every operation of [`ResourceClient`](crate::rest::ResourceClient).
//!
//! # Example
//!
//! ```rust
//! use sapim::rest::{FieldKind, FieldSpec, Resource, Schema};
//! use serde::{Deserialize, Serialize};
//!
//! const COLOR: Schema = Schema {
//!     name: "Color",
//!     endpoint: "api/v2/colors",
//!     seq_field: Some("colorSeq"),
//!     id_field: Some("name"),
//!     fields: &[
//!         FieldSpec::optional("colorSeq", FieldKind::Text),
//!         FieldSpec::required("name", FieldKind::Text),
//!     ],
//!     expand: &[],
//! };
//!
//! #[derive(Clone, Debug, Serialize, Deserialize)]
//! #[serde(rename_all = "camelCase")]
//! struct Color {
//!     color_seq: Option<String>,
//!     name: String,
//! }
//!
//! impl Resource for Color {
//!     const SCHEMA: &'static Schema = &COLOR;
//!
//!     fn seq(&self) -> Option<&str> {
//!         self.color_seq.as_deref()
//!     }
//! }
//!
//! assert_eq!(Color::SCHEMA.records_key(), "colors");
//! ```

use serde::{de::DeserializeOwned, Serialize};

use crate::rest::schema::Schema;

/// A typed entity exposed by the API.
///
/// Field names are converted to the API's camelCase wire names by serde;
/// the schema must list the same wire names.
pub trait Resource: Serialize + DeserializeOwned + Clone + Send + Sync + Sized + 'static {
    /// Description of the wire payload.
    const SCHEMA: &'static Schema;

    /// Largest page size the collection endpoint answers correctly.
    ///
    /// List requests asking for more are reduced to this size.
    const PAGE_SIZE_LIMIT: Option<u32> = None;

    /// The system-assigned identifier, once the entity exists on the server.
    fn seq(&self) -> Option<&str>;

    /// Resource name used in errors.
    #[must_use]
    fn name() -> &'static str {
        Self::SCHEMA.name
    }
}
