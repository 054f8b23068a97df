//! OpenAPI description of the stable logging endpoints.
//!
//! Served at `/api/logging/openapi.json` so host applications can merge the
//! paths and schemas into their own document.

use serde_json::{json, Value};

use crate::delivery::webhook::API_KEY_HEADER;

pub fn document() -> Value {
    let security = json!([
        { "bearerAuth": [] },
        { "apiKeyHeader": [] },
        { "apiKeyQuery": [] }
    ]);
    let formats = json!(["json", "jsonpretty", "csv", "text"]);

    json!({
        "openapi": "3.0.3",
        "info": {
            "title": "Logger API",
            "description": "Endpoints for managing and retrieving logs",
            "version": env!("CARGO_PKG_VERSION")
        },
        "paths": {
            "/api/loggersettings/debug": {
                "post": {
                    "summary": "Set debug logging mode",
                    "tags": ["Logging"],
                    "security": security,
                    "requestBody": {
                        "required": true,
                        "content": {
                            "application/json": {
                                "schema": { "$ref": "#/components/schemas/DebugSettings" }
                            }
                        }
                    },
                    "responses": {
                        "200": {
                            "description": "Debug settings updated successfully",
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/DebugSettings" }
                                }
                            }
                        },
                        "400": { "description": "Invalid request body" },
                        "401": { "description": "Unauthorized - Invalid or missing authentication" },
                        "405": { "description": "Method not allowed" }
                    }
                }
            },
            "/api/logging/log": {
                "get": {
                    "summary": "Retrieve log entries",
                    "tags": ["Logging"],
                    "security": security,
                    "parameters": [
                        query_param("from_time", "Start time (RFC3339)", json!({ "type": "string", "format": "date-time" })),
                        query_param("to_time", "End time (RFC3339)", json!({ "type": "string", "format": "date-time" })),
                        query_param("last_lines", "Number of recent lines", json!({ "type": "integer", "minimum": 1 })),
                        query_param("last_minutes", "Number of recent minutes", json!({ "type": "integer", "minimum": 1 })),
                        query_param("format", "Output format", json!({ "type": "string", "enum": formats, "default": "json" }))
                    ],
                    "responses": log_responses()
                },
                "post": {
                    "summary": "Retrieve log entries",
                    "tags": ["Logging"],
                    "security": security,
                    "requestBody": {
                        "required": true,
                        "content": {
                            "application/json": {
                                "schema": { "$ref": "#/components/schemas/LogRequest" }
                            }
                        }
                    },
                    "responses": log_responses()
                }
            }
        },
        "components": {
            "schemas": {
                "DebugSettings": {
                    "type": "object",
                    "properties": {
                        "enabled": { "type": "boolean", "description": "Whether debug logging is enabled" }
                    },
                    "required": ["enabled"]
                },
                "LogRequest": {
                    "type": "object",
                    "properties": {
                        "from_time": { "type": "string", "format": "date-time", "description": "Start time (RFC3339)" },
                        "to_time": { "type": "string", "format": "date-time", "description": "End time (RFC3339)" },
                        "last_lines": { "type": "integer", "minimum": 1, "description": "Number of recent lines" },
                        "last_minutes": { "type": "integer", "minimum": 1, "description": "Number of recent minutes" },
                        "format": { "type": "string", "enum": formats, "default": "json", "description": "Output format" }
                    }
                },
                "LogResponse": {
                    "type": "object",
                    "properties": {
                        "lines": {
                            "type": "array",
                            "items": { "type": "string" },
                            "description": "Array of log lines"
                        }
                    }
                }
            },
            "securitySchemes": {
                "bearerAuth": { "type": "http", "scheme": "bearer", "bearerFormat": "JWT" },
                "apiKeyHeader": { "type": "apiKey", "in": "header", "name": API_KEY_HEADER },
                "apiKeyQuery": { "type": "apiKey", "in": "query", "name": "API-KEY" }
            }
        }
    })
}

fn query_param(name: &str, description: &str, schema: Value) -> Value {
    json!({ "name": name, "in": "query", "description": description, "schema": schema })
}

fn log_responses() -> Value {
    json!({
        "200": {
            "description": "Log entries retrieved successfully",
            "content": {
                "application/json": { "schema": { "$ref": "#/components/schemas/LogResponse" } },
                "text/csv": { "schema": { "type": "string" } },
                "text/plain": { "schema": { "type": "string" } }
            }
        },
        "400": { "description": "Invalid parameters" },
        "401": { "description": "Unauthorized - Invalid or missing authentication" },
        "405": { "description": "Method not allowed" },
        "500": { "description": "Internal server error" }
    })
}
