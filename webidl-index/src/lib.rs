//! WebIDL ingestion into a cross-library type model.
//!
//! Each source document becomes a [`model::Library`] inside one [`model::Model`]. Parsing a blob
//! resolves type references across libraries, unifies overloads and routes `partial`
//! declarations to the type they reopen.
//!
//! ```
//! use webidl_index::docs::NoDocumentation;
//! use webidl_index::model::Kind;
//! use webidl_index::model::Model;
//!
//! let mut model = Model::new();
//! let lib = model.add_library("dom", true, Box::new(NoDocumentation));
//! webidl_index::parse_idl(&mut model, lib, "interface Foo { attribute long bar; };").unwrap();
//! let foo = model.get_type("Foo").unwrap();
//! assert_eq!(model.ty(foo).kind(), Kind::Interface);
//! ```

use error::IdlResult;
use model::LibraryId;
use model::Model;
use parse::IdlParser;

pub mod char;
pub mod docs;
pub mod error;
pub mod lex;
pub mod loc;
pub mod model;
pub mod parse;
pub mod token;

/// Parses `source` into library `lib` of `model`. The first error aborts; declarations parsed
/// before it stay registered.
pub fn parse_idl(model: &mut Model, lib: LibraryId, source: &str) -> IdlResult<()> {
  IdlParser::new(model, lib, source).parse()
}
