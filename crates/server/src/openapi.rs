use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct NoteDoc { pub id: Option<i64>, pub name: String, pub last_name: String, pub note: String }

#[derive(ToSchema)]
pub struct IdRequestDoc { pub id: i64 }

#[derive(ToSchema)]
pub struct ApiResponseDoc {
    pub result: String,
    #[schema(value_type = Option<Object>)]
    pub data: Option<serde_json::Value>,
    pub error: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::notes::create,
        crate::routes::notes::get,
        crate::routes::notes::update,
        crate::routes::notes::delete,
        crate::routes::notes::get_all,
    ),
    components(
        schemas(
            HealthResponse,
            NoteDoc,
            IdRequestDoc,
            ApiResponseDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "notes")
    )
)]
pub struct ApiDoc;
