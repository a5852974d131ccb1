//! Lua bindings, built with the `lua` feature.
//!
//! ```lua
//! local dd = require("datadrift_diff")
//!
//! -- headers as a list
//! local result = dd.diff_patch(patch, { "id", "value" }, false)
//!
//! -- headers as the serialized header line (decides comma vs tab)
//! local result = dd.diff_patch(patch, "id\tvalue", false)
//!
//! -- a raw retrieval response; returns one result per payload
//! local results = dd.diff_payload(json)
//! ```
//!
//! Sides use the same field names as the JSON wire shape (`diffType`,
//! `headers`, `data`, `isEmphasized`, `value`), so renderers can share code.

use crate::payload::CommitInfo;
use crate::projector::{Cell, DiffStats, DiffType, DualTable, Row, TableSide};
use crate::{CommitDiff, DiffOptions};
use mlua::Either;
use mlua::prelude::*;

impl IntoLua for Cell {
    fn into_lua(self, lua: &Lua) -> LuaResult<LuaValue> {
        let table = lua.create_table()?;
        table.set("isEmphasized", self.is_emphasized)?;
        table.set("value", self.value)?;
        Ok(LuaValue::Table(table))
    }
}

impl IntoLua for Row {
    fn into_lua(self, lua: &Lua) -> LuaResult<LuaValue> {
        let table = lua.create_table()?;
        table.set("isEmphasized", self.is_emphasized)?;
        table.set("is_filler", self.is_filler)?;
        table.set("line_number", self.line_number)?;

        let cells: Vec<LuaValue> = self
            .cells
            .into_iter()
            .map(|c| c.into_lua(lua))
            .collect::<LuaResult<_>>()?;
        table.set("data", lua.create_sequence_from(cells)?)?;

        Ok(LuaValue::Table(table))
    }
}

impl IntoLua for TableSide {
    fn into_lua(self, lua: &Lua) -> LuaResult<LuaValue> {
        let table = lua.create_table()?;
        table.set(
            "diffType",
            match self.diff_type {
                DiffType::Removed => "removed",
                DiffType::Added => "added",
            },
        )?;
        table.set("headers", lua.create_sequence_from(self.headers)?)?;

        let rows: Vec<LuaValue> = self
            .rows
            .into_iter()
            .map(|r| r.into_lua(lua))
            .collect::<LuaResult<_>>()?;
        table.set("data", lua.create_sequence_from(rows)?)?;

        Ok(LuaValue::Table(table))
    }
}

impl IntoLua for DiffStats {
    fn into_lua(self, lua: &Lua) -> LuaResult<LuaValue> {
        let table = lua.create_table()?;
        table.set("added", self.added)?;
        table.set("removed", self.removed)?;
        table.set("modified", self.modified)?;
        table.set("unchanged", self.unchanged)?;
        table.set("hunks", self.hunks)?;
        Ok(LuaValue::Table(table))
    }
}

impl IntoLua for DualTable {
    fn into_lua(self, lua: &Lua) -> LuaResult<LuaValue> {
        let table = lua.create_table()?;
        table.set("old", self.old.into_lua(lua)?)?;
        table.set("new", self.new.into_lua(lua)?)?;
        table.set("patch_too_large", self.patch_too_large)?;
        table.set("hunk_starts", lua.create_sequence_from(self.hunk_starts)?)?;
        table.set("stats", self.stats.into_lua(lua)?)?;
        Ok(LuaValue::Table(table))
    }
}

impl IntoLua for CommitInfo {
    fn into_lua(self, lua: &Lua) -> LuaResult<LuaValue> {
        let table = lua.create_table()?;
        table.set("filename", self.filename)?;
        table.set("commit_link", self.commit_link)?;
        table.set("date", self.date.map(|d| d.to_rfc3339()))?;
        table.set("base_commit_date", self.base_commit_date.map(|d| d.to_rfc3339()))?;
        table.set("head_commit_date", self.head_commit_date.map(|d| d.to_rfc3339()))?;
        Ok(LuaValue::Table(table))
    }
}

impl IntoLua for CommitDiff {
    fn into_lua(self, lua: &Lua) -> LuaResult<LuaValue> {
        let table = lua.create_table()?;
        table.set("commit", self.commit.into_lua(lua)?)?;
        table.set("table", self.table.into_lua(lua)?)?;
        Ok(LuaValue::Table(table))
    }
}

/// Builds the dual table for a patch. Headers are either a list of names or
/// the serialized header line.
fn diff_patch(
    lua: &Lua,
    (patch, headers, patch_too_large): (String, Either<String, Vec<String>>, Option<bool>),
) -> LuaResult<LuaValue> {
    let options = DiffOptions::from_env().map_err(LuaError::external)?;
    let patch_too_large = patch_too_large.unwrap_or(false);

    let table = match headers {
        Either::Left(header_line) => {
            crate::diff_patch_with_header_line(&patch, &header_line, patch_too_large, &options)
        }
        Either::Right(headers) => crate::diff_patch(&patch, headers, patch_too_large, &options),
    };
    table.into_lua(lua)
}

/// Parses a retrieval response and builds the dual table of every payload in it.
fn diff_payload(lua: &Lua, json: String) -> LuaResult<LuaTable> {
    let options = DiffOptions::from_env().map_err(LuaError::external)?;
    let results = crate::diff_payload_json(&json, &options).map_err(LuaError::external)?;

    let values: Vec<LuaValue> = results
        .into_iter()
        .map(|r| r.into_lua(lua))
        .collect::<LuaResult<_>>()?;
    lua.create_sequence_from(values)
}

/// Creates the Lua module exports. Called by mlua when loaded via `require("datadrift_diff")`.
#[mlua::lua_module]
fn datadrift_diff(lua: &Lua) -> LuaResult<LuaTable> {
    let exports = lua.create_table()?;
    exports.set(
        "diff_patch",
        lua.create_function(
            |lua, args: (String, Either<String, Vec<String>>, Option<bool>)| diff_patch(lua, args),
        )?,
    )?;
    exports.set(
        "diff_payload",
        lua.create_function(|lua, json: String| diff_payload(lua, json))?,
    )?;
    Ok(exports)
}
