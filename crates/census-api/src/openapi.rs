//! OpenAPI description of the person API, served with Swagger UI.

use census_core::person::{CreatePersonRequest, Person, UpdatePersonRequest};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{error::ErrorBody, persons};

/// Where the OpenAPI JSON document is served.
pub const OPENAPI_PATH: &str = "/api-docs/openapi.json";

/// Where Swagger UI is mounted.
pub const SWAGGER_PATH: &str = "/swagger";

#[derive(OpenApi)]
#[openapi(
  info(
    title = "Census",
    description = "Person registry with age, gender and nationality enrichment"
  ),
  paths(
    persons::list,
    persons::create,
    persons::get_one,
    persons::update,
    persons::delete,
  ),
  components(schemas(Person, CreatePersonRequest, UpdatePersonRequest, ErrorBody)),
  tags((name = "persons", description = "Create, read, update and delete persons"))
)]
pub struct ApiDoc;

/// Swagger UI at [`SWAGGER_PATH`] backed by the document at
/// [`OPENAPI_PATH`].
pub fn swagger_ui() -> SwaggerUi {
  SwaggerUi::new(SWAGGER_PATH).url(OPENAPI_PATH, ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
  use utoipa::OpenApi as _;

  use super::ApiDoc;

  #[test]
  fn document_covers_every_route() {
    let doc = ApiDoc::openapi();
    let paths = &doc.paths.paths;
    assert!(paths.contains_key("/persons"));
    assert!(paths.contains_key("/persons/{id}"));

    let item = &paths["/persons/{id}"];
    assert!(item.get.is_some());
    assert!(item.put.is_some());
    assert!(item.delete.is_some());
  }
}
