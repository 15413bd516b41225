//! # Demo Application
//!
//! Routes documented when the server starts without a manifest: a small
//! user directory with self-referencing users, shared addresses and paged
//! listing.

use oab_schema::class::{DeclaredSchema, Fields, SchemaClass, SchemaInstance};
use oab_schema::fields::{Boolean, Date, DateTime, Email, Integer, List, Nested, Str, Url, Uuid};
use oab_schema::{RouteDoc, RouteError, RouteTable, SchemaValue};

use crate::state::DocsSource;

pub struct Address;

impl DeclaredSchema for Address {
    fn declare_fields() -> Fields {
        Fields::new()
            .field("street", Str)
            .field("city", Str)
            .field("postcode", Str)
    }
}

pub struct User;

impl DeclaredSchema for User {
    fn declare_fields() -> Fields {
        Fields::new()
            .field("id", Uuid)
            .field("email", Email)
            .field("name", Str)
            .field("birthday", Date)
            .field("created_at", DateTime)
            .field("homepage", Url)
            .field("active", Boolean)
            .field("address", Nested::of::<Address>())
            .field("friends", Nested::of::<User>().many())
            .field("nicknames", List::new(Str))
    }
}

pub struct UserQuery;

impl DeclaredSchema for UserQuery {
    fn declare_fields() -> Fields {
        Fields::new()
            .field("page", Integer)
            .field("per_page", Integer)
            .field("active", Boolean)
    }
}

pub struct ApiError;

impl DeclaredSchema for ApiError {
    fn schema_name() -> &'static str {
        "Error"
    }

    fn declare_fields() -> Fields {
        Fields::new().field("code", Str).field("message", Str)
    }
}

/// The demo route table.
///
/// # Errors
///
/// Only on a bug in the table itself (duplicate operation or bad template).
pub fn routes() -> Result<RouteTable, RouteError> {
    let error = || -> Option<Box<dyn SchemaValue>> { Some(Box::new(SchemaClass::of::<ApiError>())) };
    let mut table = RouteTable::new();
    table
        .register(
            RouteDoc::get("/users")
                .summary("List users")
                .operation_id("listUsers")
                .tag("users")
                .query(SchemaInstance::of::<UserQuery>())
                .response(200, "A page of users", SchemaClass::of::<User>().instantiate_many())
                .default_response("Unexpected error", error()),
        )?
        .register(
            RouteDoc::post("/users")
                .summary("Create a user")
                .operation_id("createUser")
                .tag("users")
                .request(SchemaClass::of::<User>())
                .response(201, "The created user", SchemaClass::of::<User>())
                .default_response("Unexpected error", error()),
        )?
        .register(
            RouteDoc::get("/users/{user_id}")
                .summary("Fetch a user")
                .operation_id("getUser")
                .tag("users")
                .response(200, "The user", SchemaClass::of::<User>())
                .empty_response(404, "No such user"),
        )?
        .register(
            RouteDoc::delete("/users/{user_id}")
                .summary("Delete a user")
                .operation_id("deleteUser")
                .tag("users")
                .empty_response(204, "Deleted"),
        )?;
    Ok(table)
}

/// The demo application as a document source.
pub fn source() -> DocsSource {
    DocsSource::routes(routes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_table_registers() {
        assert_eq!(routes().unwrap().len(), 4);
    }
}
