use serde::Serialize;
use stackline_core::{LayoutConfig, Timeline, UpstreamToggle};
use stackline_protocol::{ItemId, ItemRecord, RowId, RowRecord, Timestamp, Trigger};
use wasm_bindgen::prelude::*;

fn js_err(e: impl std::fmt::Display) -> JsError {
    JsError::new(&e.to_string())
}

/// A JS number as a timestamp: finite, whole and inside the `i64` range.
fn timestamp(value: f64) -> Option<Timestamp> {
    // -2^63 is exact as f64; 2^63 is the first value past i64::MAX.
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    (value.is_finite() && value.fract() == 0.0 && (-LIMIT..LIMIT).contains(&value))
        .then_some(value as Timestamp)
}

fn timestamp_arg(name: &str, value: f64) -> Result<Timestamp, JsError> {
    timestamp(value).ok_or_else(|| JsError::new(&format!("{name} is not a valid timestamp: {value}")))
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, JsError> {
    serde_json::to_string(value).map_err(js_err)
}

/// One timeline and its layout state. Each instance is independent, so a
/// page can host several timelines.
#[wasm_bindgen]
#[derive(Default)]
pub struct WasmTimeline {
    inner: Timeline,
}

#[wasm_bindgen]
impl WasmTimeline {
    /// Create a timeline from a JSON `LayoutConfig`; an empty string uses
    /// the defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<WasmTimeline, JsError> {
        let config = if config_json.trim().is_empty() {
            LayoutConfig::default()
        } else {
            serde_json::from_str(config_json).map_err(js_err)?
        };
        Ok(Self {
            inner: Timeline::new(config),
        })
    }

    /// Register rows from a JSON array of row records.
    pub fn add_rows(&mut self, rows_json: &str) -> Result<(), JsError> {
        let rows: Vec<RowRecord> = serde_json::from_str(rows_json).map_err(js_err)?;
        for row in rows {
            self.inner.add_row(row);
        }
        Ok(())
    }

    /// Register items from a JSON array of item records. Stops at the first
    /// rejected record; earlier ones stay registered.
    pub fn add_items(&mut self, items_json: &str) -> Result<(), JsError> {
        let items: Vec<ItemRecord> = serde_json::from_str(items_json).map_err(js_err)?;
        for item in items {
            self.inner.add_item(item).map_err(js_err)?;
        }
        Ok(())
    }

    /// Replace one item from a JSON item record.
    pub fn update_item(&mut self, item_json: &str) -> Result<(), JsError> {
        let item: ItemRecord = serde_json::from_str(item_json).map_err(js_err)?;
        self.inner.update_item(item).map_err(js_err)?;
        Ok(())
    }

    pub fn remove_item(&mut self, id: &str) -> Result<(), JsError> {
        self.inner.remove_item(&ItemId::from(id)).map_err(js_err)?;
        Ok(())
    }

    /// Apply a drag edit. Returns `"moved"` or `"resized"`. Times must be
    /// whole milliseconds; a resize that would empty the item is an error and
    /// leaves it unchanged.
    pub fn move_item(&mut self, id: &str, start: f64, end: f64) -> Result<String, JsError> {
        let start = timestamp_arg("start", start)?;
        let end = timestamp_arg("end", end)?;
        let kind = self
            .inner
            .move_item(&ItemId::from(id), start, end)
            .map_err(js_err)?;
        Ok(match kind {
            stackline_core::EditKind::Moved => "moved",
            stackline_core::EditKind::Resized => "resized",
        }
        .to_string())
    }

    pub fn set_item_geometry(&mut self, id: &str, left: f64, width: f64) -> Result<(), JsError> {
        self.inner
            .set_item_geometry(
                &ItemId::from(id),
                stackline_protocol::Extent::new(left, width),
            )
            .map_err(js_err)
    }

    /// Handle a JSON trigger such as `{"kind":"toggleRequested","row":"r1"}`
    /// and return the emitted layout commands as JSON.
    pub fn handle(&mut self, trigger_json: &str) -> Result<String, JsError> {
        let trigger: Trigger = serde_json::from_str(trigger_json).map_err(js_err)?;
        let commands = self.inner.handle(&trigger).map_err(js_err)?;
        to_json(&commands)
    }

    /// Notify that the host widget expanded or collapsed a row on its own.
    /// Returns `true` when the host should run its default handling.
    pub fn on_upstream_toggle(&mut self, row: &str) -> Result<bool, JsError> {
        let outcome = self.inner.on_upstream_toggle(&RowId::from(row)).map_err(js_err)?;
        Ok(outcome == UpstreamToggle::Forward)
    }

    pub fn row_height(&self, row: &str) -> Option<f64> {
        self.inner.row_height(&RowId::from(row))
    }

    pub fn item_offset(&self, id: &str) -> Option<f64> {
        self.inner.item_offset(&ItemId::from(id))
    }

    /// Current mode of a row as JSON (`"Stacked"` / `"Unstacked"`).
    pub fn row_mode(&self, row: &str) -> Result<Option<String>, JsError> {
        self.inner
            .row_mode(&RowId::from(row))
            .map(|mode| to_json(&mode))
            .transpose()
    }
}
