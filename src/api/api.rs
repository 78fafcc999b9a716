use actix_web::error::InternalError;
use actix_web::{delete, get, post, put, web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::models::todo::{TodoCompact, TodoInput, TodoUpdate};
use crate::repository::database::Database;
use crate::Response;

#[derive(Deserialize)]
pub struct ListFilter {
    complete: Option<String>,
}

#[get("/")]
pub async fn get_todos(db: web::Data<Database>, filter: web::Query<ListFilter>) -> HttpResponse {
    let flag = match filter.complete.as_deref() {
        None => None,
        Some("true") => Some(true),
        Some("false") => Some(false),
        Some(other) => {
            return HttpResponse::BadRequest().json(Response {
                message: format!(
                    "invalid value {:?} for complete, expected \"true\" or \"false\"",
                    other
                ),
            })
        }
    };
    match db.get_todos(flag) {
        Ok(rows) => {
            let compact = rows.into_iter().map(TodoCompact::from).collect::<Vec<_>>();
            HttpResponse::Ok().json(compact)
        }
        Err(err) => internal_error(err),
    }
}

#[post("/")]
pub async fn create_todo(db: web::Data<Database>, body: web::Json<TodoInput>) -> HttpResponse {
    let input = body.into_inner();
    if let Some(response) = validate_title(&input.title) {
        return response;
    }
    match db.create_todo(input) {
        Ok(todo) => HttpResponse::Created().json(TodoCompact::from(todo)),
        Err(err) => internal_error(err),
    }
}

#[get("/{id}/")]
pub async fn get_todo_by_id(db: web::Data<Database>, path: web::Path<i32>) -> HttpResponse {
    let todo_id = path.into_inner();
    match db.get_todo_by_id(todo_id) {
        Ok(Some(todo)) => HttpResponse::Ok().json(todo),
        Ok(None) => todo_not_found(),
        Err(err) => internal_error(err),
    }
}

#[put("/{id}/")]
pub async fn update_todo_by_id(
    db: web::Data<Database>,
    path: web::Path<i32>,
    body: web::Bytes,
) -> HttpResponse {
    let todo_id = path.into_inner();
    // The row's existence decides first; the body is only parsed and
    // validated for an id that exists.
    match db.get_todo_by_id(todo_id) {
        Ok(Some(_)) => {}
        Ok(None) => return todo_not_found(),
        Err(err) => return internal_error(err),
    }
    let input: TodoUpdate = match serde_json::from_slice(&body) {
        Ok(input) => input,
        Err(err) => {
            return HttpResponse::BadRequest().json(Response {
                message: err.to_string(),
            })
        }
    };
    if let Some(response) = validate_title(&input.title) {
        return response;
    }
    match db.update_todo_by_id(todo_id, input.into()) {
        Ok(Some(todo)) => HttpResponse::Ok().json(TodoCompact::from(todo)),
        Ok(None) => todo_not_found(),
        Err(err) => internal_error(err),
    }
}

#[delete("/{id}/")]
pub async fn delete_todo_by_id(db: web::Data<Database>, path: web::Path<i32>) -> HttpResponse {
    let todo_id = path.into_inner();
    match db.delete_todo_by_id(todo_id) {
        Ok(Some(todo)) => HttpResponse::Ok().json(todo),
        Ok(None) => todo_not_found(),
        Err(err) => internal_error(err),
    }
}

/// Title constraints carried by the model: required, non-blank, at most
/// 100 characters. Returns the 400 response with field errors on violation.
fn validate_title(todo_title: &str) -> Option<HttpResponse> {
    let message = if todo_title.trim().is_empty() {
        Some("This field may not be blank.")
    } else if todo_title.chars().count() > 100 {
        Some("Ensure this field has no more than 100 characters.")
    } else {
        None
    };
    message.map(|m| HttpResponse::BadRequest().json(json!({ "title": [m] })))
}

fn todo_not_found() -> HttpResponse {
    HttpResponse::NotFound().json(Response {
        message: "Todo not found".to_string(),
    })
}

fn internal_error(err: anyhow::Error) -> HttpResponse {
    log::error!("database error: {:#}", err);
    HttpResponse::InternalServerError().json(Response {
        message: "internal server error".to_string(),
    })
}

/// Turns body deserialization failures (missing fields, malformed JSON)
/// into 400 responses with a JSON message body.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let message = err.to_string();
        InternalError::from_response(
            err,
            HttpResponse::BadRequest().json(Response { message }),
        )
        .into()
    })
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/todo")
            .service(get_todos)
            .service(create_todo)
            .service(get_todo_by_id)
            .service(update_todo_by_id)
            .service(delete_todo_by_id),
    );
}
