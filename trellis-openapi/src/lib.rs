// Trellis OpenAPI - document types and the registry-driven generator
//
// The generator reads the same metadata registry the route compiler reads
// and shares its defaulting rules, so the published document describes
// exactly what the runtime does.

pub mod builder;
pub mod generator;
pub mod spec;

pub use builder::{
    boolean_schema, error_envelope_schema, integer_schema, object_schema, string_schema,
    success_envelope_schema, OpenApiBuilder,
};
pub use generator::DocumentBuilder;
pub use spec::{
    Info, MediaType, OpenApiDocument, Operation, Parameter, ParameterLocation, PathItem,
    RequestBody, ResponseObject, Server, Tag,
};
