//! Builtin Google Calendar v3 tool definitions.
//!
//! Ref: https://developers.google.com/calendar/api/v3/reference

use super::catalog::{
    BodyShape, HttpMethod, ParamDef, ParamLocation, ParamType, ToolCatalog, ToolDefinition,
    ToolFamily,
};
use crate::types::Result;
use serde_json::json;

const MAX_RESULTS_LIMIT: i64 = 2500;
const DEFAULT_MAX_RESULTS: i64 = 25;

fn tool(
    name: &str,
    description: &str,
    family: ToolFamily,
    method: HttpMethod,
    path_template: &str,
) -> ToolDefinition {
    ToolDefinition {
        name: name.to_string(),
        description: description.to_string(),
        family,
        method,
        path_template: path_template.to_string(),
        params: Vec::new(),
        body: BodyShape::Empty,
        fixed_query: Vec::new(),
    }
}

impl ToolDefinition {
    fn with(mut self, param: ParamDef) -> Self {
        self.params.push(param);
        self
    }

    fn body_shape(mut self, body: BodyShape) -> Self {
        self.body = body;
        self
    }

    fn fixed(mut self, key: &str, value: &str) -> Self {
        self.fixed_query.push((key.to_string(), value.to_string()));
        self
    }
}

// -----------------------------------------------------------------------------
// Parameter shorthands
// -----------------------------------------------------------------------------

fn path(name: &str, description: &str) -> ParamDef {
    ParamDef::new(name, ParamLocation::Path, ParamType::String, description)
}

fn calendar_id() -> ParamDef {
    path("calendarId", "Calendar identifier, or \"primary\"")
}

fn calendar_id_or_primary() -> ParamDef {
    calendar_id().with_default(json!("primary"))
}

fn event_id() -> ParamDef {
    path("eventId", "Event identifier")
}

fn optional_query(name: &str, inner: ParamType, description: &str) -> ParamDef {
    ParamDef::new(
        name,
        ParamLocation::Query,
        ParamType::Optional(Box::new(inner)),
        description,
    )
}

fn send_updates() -> ParamDef {
    optional_query(
        "sendUpdates",
        ParamType::Enum(vec![
            "all".to_string(),
            "externalOnly".to_string(),
            "none".to_string(),
        ]),
        "Which guests receive notifications",
    )
}

fn supports_attachments() -> ParamDef {
    optional_query(
        "supportsAttachments",
        ParamType::Bool,
        "Whether the client supports event attachments",
    )
}

fn time_min() -> ParamDef {
    optional_query("timeMin", ParamType::String, "Lower bound (RFC3339) for event end time")
}

fn time_max() -> ParamDef {
    optional_query("timeMax", ParamType::String, "Upper bound (RFC3339) for event start time")
}

fn max_results() -> ParamDef {
    ParamDef::new(
        "maxResults",
        ParamLocation::Query,
        ParamType::Int,
        "Maximum number of results",
    )
    .with_default(json!(DEFAULT_MAX_RESULTS))
    .with_clamp(1, MAX_RESULTS_LIMIT)
}

fn document(name: &str, description: &str) -> ParamDef {
    ParamDef::new(name, ParamLocation::Body, ParamType::Object, description)
}

fn optional_field(name: &str, description: &str) -> ParamDef {
    ParamDef::new(
        name,
        ParamLocation::Body,
        ParamType::Optional(Box::new(ParamType::String)),
        description,
    )
}

fn channel() -> ParamDef {
    document("channel", "Notification channel resource (id, type, address)")
}

// -----------------------------------------------------------------------------
// Families
// -----------------------------------------------------------------------------

fn calendars() -> Vec<ToolDefinition> {
    use HttpMethod::*;
    use ToolFamily::Calendars;

    vec![
        tool("gcal_get_calendar", "Get details of a specific calendar", Calendars, Get, "/calendars/{calendarId}")
            .with(calendar_id()),
        tool("gcal_create_calendar", "Create a secondary calendar", Calendars, Post, "/calendars")
            .with(ParamDef::new("summary", ParamLocation::Body, ParamType::String, "Calendar title"))
            .with(optional_field("description", "Calendar description"))
            .with(optional_field("timeZone", "IANA time zone, e.g. Europe/Zurich"))
            .with(optional_field("location", "Geographic location"))
            .body_shape(BodyShape::Fields),
        tool("gcal_delete_calendar", "Delete a secondary calendar", Calendars, Delete, "/calendars/{calendarId}")
            .with(calendar_id()),
        tool(
            "gcal_clear_calendar",
            "Clear a calendar (deletes all events). Typically used for primary calendar.",
            Calendars,
            Post,
            "/calendars/{calendarId}/clear",
        )
        .with(calendar_id_or_primary()),
        tool("gcal_patch_calendar", "Patch calendar metadata", Calendars, Patch, "/calendars/{calendarId}")
            .with(calendar_id())
            .with(document("patch", "Partial calendar resource"))
            .body_shape(BodyShape::Document),
        tool("gcal_update_calendar", "Update calendar metadata (full replace)", Calendars, Put, "/calendars/{calendarId}")
            .with(calendar_id())
            .with(document("calendar", "Calendar resource"))
            .body_shape(BodyShape::Document),
    ]
}

fn calendar_list() -> Vec<ToolDefinition> {
    use HttpMethod::*;
    use ToolFamily::CalendarList;

    vec![
        tool("gcal_list_calendars", "List all calendars accessible by the user", CalendarList, Get, "/users/me/calendarList")
            .fixed("minAccessRole", "reader"),
        tool("gcal_calendarlist_get", "Get a calendar list entry", CalendarList, Get, "/users/me/calendarList/{calendarId}")
            .with(calendar_id()),
        tool(
            "gcal_calendarlist_insert",
            "Insert an existing calendar into the user's calendar list",
            CalendarList,
            Post,
            "/users/me/calendarList",
        )
        .with(document("entry", "Calendar list entry resource"))
        .body_shape(BodyShape::Document),
        tool(
            "gcal_calendarlist_delete",
            "Remove a calendar from the user's calendar list",
            CalendarList,
            Delete,
            "/users/me/calendarList/{calendarId}",
        )
        .with(calendar_id()),
        tool("gcal_calendarlist_patch", "Patch a calendar list entry", CalendarList, Patch, "/users/me/calendarList/{calendarId}")
            .with(calendar_id())
            .with(document("patch", "Partial calendar list entry"))
            .body_shape(BodyShape::Document),
        tool(
            "gcal_calendarlist_update",
            "Update a calendar list entry (full replace)",
            CalendarList,
            Put,
            "/users/me/calendarList/{calendarId}",
        )
        .with(calendar_id())
        .with(document("entry", "Calendar list entry resource"))
        .body_shape(BodyShape::Document),
    ]
}

fn events() -> Vec<ToolDefinition> {
    use HttpMethod::*;
    use ToolFamily::Events;

    vec![
        tool("gcal_list_events", "List events from a calendar", Events, Get, "/calendars/{calendarId}/events")
            .with(calendar_id_or_primary())
            .with(time_min())
            .with(time_max())
            .with(max_results())
            .with(
                ParamDef::new("singleEvents", ParamLocation::Query, ParamType::Bool, "Expand recurring events into instances")
                    .with_default(json!(true)),
            )
            .with(
                ParamDef::new(
                    "orderBy",
                    ParamLocation::Query,
                    ParamType::Enum(vec!["startTime".to_string(), "updated".to_string()]),
                    "Result ordering (sent only with singleEvents)",
                )
                .with_default(json!("startTime"))
                .only_if("singleEvents"),
            ),
        tool("gcal_get_event", "Get a specific event by ID", Events, Get, "/calendars/{calendarId}/events/{eventId}")
            .with(calendar_id())
            .with(event_id()),
        tool("gcal_search_events", "Search for events by text query", Events, Get, "/calendars/{calendarId}/events")
            .with(ParamDef::new("query", ParamLocation::Query, ParamType::String, "Free text search").with_wire_name("q"))
            .with(calendar_id_or_primary())
            .with(time_min())
            .with(time_max())
            .with(max_results())
            .fixed("singleEvents", "true")
            .fixed("orderBy", "startTime"),
        tool(
            "gcal_get_event_instances",
            "Get instances of a recurring event",
            Events,
            Get,
            "/calendars/{calendarId}/events/{eventId}/instances",
        )
        .with(calendar_id())
        .with(event_id())
        .with(time_min())
        .with(time_max())
        .with(max_results()),
        tool("gcal_create_event", "Create an event", Events, Post, "/calendars/{calendarId}/events")
            .with(calendar_id())
            .with(document("event", "Event resource"))
            .with(send_updates())
            .with(supports_attachments())
            .body_shape(BodyShape::Document),
        tool("gcal_delete_event", "Delete an event", Events, Delete, "/calendars/{calendarId}/events/{eventId}")
            .with(calendar_id())
            .with(event_id())
            .with(send_updates()),
        tool("gcal_patch_event", "Patch an event (partial update)", Events, Patch, "/calendars/{calendarId}/events/{eventId}")
            .with(calendar_id())
            .with(event_id())
            .with(document("patch", "Partial event resource"))
            .with(send_updates())
            .body_shape(BodyShape::Document),
        tool("gcal_update_event", "Update an event (full replace)", Events, Put, "/calendars/{calendarId}/events/{eventId}")
            .with(calendar_id())
            .with(event_id())
            .with(document("event", "Event resource"))
            .with(send_updates())
            .body_shape(BodyShape::Document),
        tool(
            "gcal_quick_add_event",
            "Quick add an event from a text string",
            Events,
            Post,
            "/calendars/{calendarId}/events/quickAdd",
        )
        .with(calendar_id())
        .with(ParamDef::new("text", ParamLocation::Query, ParamType::String, "Text describing the event"))
        .with(send_updates()),
        tool(
            "gcal_move_event",
            "Move an event to another calendar (changes organizer)",
            Events,
            Post,
            "/calendars/{sourceCalendarId}/events/{eventId}/move",
        )
        .with(path("sourceCalendarId", "Calendar the event currently lives on"))
        .with(event_id())
        .with(
            ParamDef::new("destinationCalendarId", ParamLocation::Query, ParamType::String, "Target calendar")
                .with_wire_name("destination"),
        )
        .with(send_updates()),
        tool(
            "gcal_import_event",
            "Import an event (creates a private copy)",
            Events,
            Post,
            "/calendars/{calendarId}/events/import",
        )
        .with(calendar_id())
        .with(document("event", "Event resource with iCalUID"))
        .with(supports_attachments())
        .body_shape(BodyShape::Document),
    ]
}

fn free_busy() -> Vec<ToolDefinition> {
    vec![tool(
        "gcal_get_freebusy",
        "Query free/busy information for calendars",
        ToolFamily::FreeBusy,
        HttpMethod::Post,
        "/freeBusy",
    )
    .with(ParamDef::new("timeMin", ParamLocation::Body, ParamType::String, "Start of the interval (RFC3339)"))
    .with(ParamDef::new("timeMax", ParamLocation::Body, ParamType::String, "End of the interval (RFC3339)"))
    .with(
        ParamDef::new(
            "calendarIds",
            ParamLocation::Body,
            ParamType::Optional(Box::new(ParamType::StringList)),
            "Calendars to query",
        )
        .with_default(json!(["primary"])),
    )
    .with(optional_field("timeZone", "Time zone for the response"))
    .body_shape(BodyShape::FreeBusyQuery)]
}

fn settings() -> Vec<ToolDefinition> {
    use HttpMethod::*;
    use ToolFamily::Settings;

    vec![
        tool("gcal_get_settings", "Get user's calendar settings", Settings, Get, "/users/me/settings"),
        tool("gcal_get_setting", "Get a specific calendar setting", Settings, Get, "/users/me/settings/{settingId}")
            .with(path("settingId", "Setting identifier, e.g. timezone")),
    ]
}

fn colors() -> Vec<ToolDefinition> {
    vec![tool(
        "gcal_get_colors",
        "Get available calendar and event colors",
        ToolFamily::Colors,
        HttpMethod::Get,
        "/colors",
    )]
}

fn watch() -> Vec<ToolDefinition> {
    use HttpMethod::*;
    use ToolFamily::Watch;

    vec![
        tool("gcal_channels_stop", "Stop watching a channel (channels.stop)", Watch, Post, "/channels/stop")
            .with(channel())
            .body_shape(BodyShape::Document),
        tool(
            "gcal_events_watch",
            "Watch for changes to Events resources (requires webhook endpoint)",
            Watch,
            Post,
            "/calendars/{calendarId}/events/watch",
        )
        .with(calendar_id())
        .with(channel())
        .with(time_min())
        .with(time_max())
        .with(optional_query("singleEvents", ParamType::Bool, "Expand recurring events"))
        .body_shape(BodyShape::Document),
        tool(
            "gcal_calendarlist_watch",
            "Watch for changes to CalendarList resources (requires webhook endpoint)",
            Watch,
            Post,
            "/users/me/calendarList/watch",
        )
        .with(channel())
        .body_shape(BodyShape::Document),
        tool(
            "gcal_settings_watch",
            "Watch for changes to Settings resources (requires webhook endpoint)",
            Watch,
            Post,
            "/users/me/settings/watch",
        )
        .with(channel())
        .body_shape(BodyShape::Document),
    ]
}

/// All builtin definitions, grouped by family.
pub fn builtin_definitions() -> Vec<ToolDefinition> {
    let mut all = Vec::new();
    all.extend(calendars());
    all.extend(calendar_list());
    all.extend(events());
    all.extend(free_busy());
    all.extend(settings());
    all.extend(colors());
    all.extend(watch());
    all
}

/// Catalog pre-populated with every builtin calendar tool.
pub fn builtin_catalog() -> Result<ToolCatalog> {
    let mut catalog = ToolCatalog::new();
    for definition in builtin_definitions() {
        catalog.register(definition)?;
    }
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::catalog::{SCOPE_CALENDAR, SCOPE_CALENDAR_EVENTS};
    use serde_json::{Map, Value};

    #[test]
    fn test_builtin_catalog_registers_every_tool() {
        let catalog = builtin_catalog().unwrap();
        assert_eq!(catalog.len(), 31);
        assert!(catalog.has_tool("gcal_get_event"));
        assert!(catalog.has_tool("gcal_calendarlist_watch"));
    }

    #[test]
    fn test_every_family_is_represented() {
        let families: std::collections::HashSet<ToolFamily> =
            builtin_definitions().iter().map(|d| d.family).collect();
        assert_eq!(families.len(), 7);
    }

    #[test]
    fn test_omitting_any_required_parameter_is_reported() {
        let catalog = builtin_catalog().unwrap();
        for definition in catalog.list_entries() {
            for required in definition.params.iter().filter(|p| p.is_required()) {
                let mut args = Map::new();
                for p in definition.params.iter().filter(|p| p.is_required()) {
                    if p.name != required.name {
                        args.insert(p.name.clone(), sample_value(&p.param_type));
                    }
                }
                let errors = catalog
                    .validate_params(&definition.name, &Value::Object(args))
                    .unwrap();
                assert_eq!(
                    errors,
                    vec![format!("Missing required parameter: {}", required.name)],
                    "tool {}",
                    definition.name
                );
            }
        }
    }

    #[test]
    fn test_all_required_parameters_pass_validation() {
        let catalog = builtin_catalog().unwrap();
        for definition in catalog.list_entries() {
            let args: Map<String, Value> = definition
                .params
                .iter()
                .filter(|p| p.is_required())
                .map(|p| (p.name.clone(), sample_value(&p.param_type)))
                .collect();
            let errors = catalog
                .validate_params(&definition.name, &Value::Object(args))
                .unwrap();
            assert!(errors.is_empty(), "tool {}: {:?}", definition.name, errors);
        }
    }

    #[test]
    fn test_required_scopes() {
        let catalog = builtin_catalog().unwrap();
        assert_eq!(
            catalog.required_scopes(),
            vec![SCOPE_CALENDAR.to_string(), SCOPE_CALENDAR_EVENTS.to_string()]
        );
    }

    #[test]
    fn test_tool_listing_snapshot() {
        let catalog = builtin_catalog().unwrap();
        let summary: Vec<String> = catalog
            .list_entries()
            .iter()
            .map(|d| format!("{} {} {}", d.name, d.method.as_str(), d.path_template))
            .collect();
        insta::assert_json_snapshot!("builtin_tool_routes", summary);
    }

    fn sample_value(param_type: &ParamType) -> Value {
        match param_type {
            ParamType::String => json!("x"),
            ParamType::Int => json!(1),
            ParamType::Bool => json!(true),
            ParamType::Object => json!({}),
            ParamType::StringList => json!(["x"]),
            ParamType::Enum(variants) => json!(variants[0]),
            ParamType::Optional(inner) => sample_value(inner),
        }
    }
}
