//! Schema fixtures shared by the unit tests.

use crate::schema::{FieldType, Schema, SchemaRef};

#[derive(Debug)]
pub struct PostSchema;

impl Schema for PostSchema {
    fn dataset(&self) -> &str {
        "post_entity"
    }

    fn field_names(&self) -> &[&str] {
        &["id", "title", "views", "rating", "published", "meta"]
    }

    fn field_type(&self, name: &str) -> FieldType {
        match name {
            "id" => FieldType::Integer,
            "title" => FieldType::String,
            "views" => FieldType::Integer,
            "rating" => FieldType::Float,
            "published" => FieldType::Boolean,
            _ => FieldType::Unknown,
        }
    }

    fn primary_key(&self) -> Option<&str> {
        Some("id")
    }
}

#[derive(Debug)]
pub struct CommentSchema;

impl Schema for CommentSchema {
    fn dataset(&self) -> &str {
        "comment_entity"
    }

    fn field_names(&self) -> &[&str] {
        &["id", "text", "post_id"]
    }

    fn field_type(&self, name: &str) -> FieldType {
        match name {
            "id" | "post_id" => FieldType::Integer,
            "text" => FieldType::String,
            _ => FieldType::Unknown,
        }
    }

    fn primary_key(&self) -> Option<&str> {
        Some("id")
    }
}

/// A schema without a primary key.
#[derive(Debug)]
pub struct TagSchema;

impl Schema for TagSchema {
    fn dataset(&self) -> &str {
        "tags"
    }

    fn field_names(&self) -> &[&str] {
        &["name"]
    }

    fn field_type(&self, name: &str) -> FieldType {
        match name {
            "name" => FieldType::String,
            _ => FieldType::Unknown,
        }
    }

    fn primary_key(&self) -> Option<&str> {
        None
    }
}

static POST: PostSchema = PostSchema;
static COMMENT: CommentSchema = CommentSchema;
static TAG: TagSchema = TagSchema;

pub fn post() -> SchemaRef {
    &POST
}

pub fn comment() -> SchemaRef {
    &COMMENT
}

pub fn tag() -> SchemaRef {
    &TAG
}
