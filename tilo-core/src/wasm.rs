//! WASM bindings for the tilo-core library.
//!
//! `TileLayout` holds the tree-of-life map, the live layout tree and the
//! layout options between calls from the frontend. Every layout call
//! returns a `LayoutOutput` JSON document; failures are reported in its
//! `error` field and logged to the console.

use serde_json::to_string;
use thiserror::Error;
use wasm_bindgen::prelude::*;

use crate::layout::{LayoutError, LayoutOptions, LayoutRequest, PointF, SizeF, try_layout};
use crate::output::LayoutOutput;
use crate::tree::{LayoutChange, LayoutTree, NodeId, TolMap, TreeError};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console, js_name = log)]
    pub fn console_log(s: &str);

    #[wasm_bindgen(js_namespace = console, js_name = error)]
    pub fn console_error(s: &str);
}

/// Errors from setting up a `TileLayout`.
#[derive(Debug, Error)]
pub enum BindingError {
    #[error("invalid {what} JSON: {source}")]
    Json {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    Layout(#[from] LayoutError),
}

/// Structural edit requested by the frontend, by node name.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Edit<'a> {
    Expand(&'a str),
    Collapse(&'a str),
}

#[wasm_bindgen]
pub struct TileLayout {
    tol: TolMap,
    tree: LayoutTree,
    opts: LayoutOptions,
}

#[wasm_bindgen]
impl TileLayout {
    #[wasm_bindgen(constructor)]
    pub fn new(
        tol_json: &str,
        root: &str,
        depth: usize,
        options_json: &str,
    ) -> Result<TileLayout, JsError> {
        match Self::from_json(tol_json, root, depth, options_json) {
            Ok(layout) => {
                console_log(&format!(
                    "tilo: {} nodes visible under '{root}'",
                    layout.tree.len()
                ));
                Ok(layout)
            }
            Err(e) => {
                console_error(&format!("Error creating tile layout: {e}"));
                Err(JsError::new(&e.to_string()))
            }
        }
    }

    /// Lay out the current tree within the given area.
    pub fn layout(&mut self, x: f64, y: f64, w: f64, h: f64, allow_collapse: bool) -> String {
        self.respond(None, x, y, w, h, allow_collapse)
    }

    /// Expand the named node, keeping the old layout if the new one fails.
    #[allow(clippy::too_many_arguments)]
    pub fn expand(
        &mut self,
        name: &str,
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        allow_collapse: bool,
    ) -> String {
        self.respond(Some(Edit::Expand(name)), x, y, w, h, allow_collapse)
    }

    /// Collapse the named node, keeping the old layout if the new one fails.
    #[allow(clippy::too_many_arguments)]
    pub fn collapse(
        &mut self,
        name: &str,
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        allow_collapse: bool,
    ) -> String {
        self.respond(Some(Edit::Collapse(name)), x, y, w, h, allow_collapse)
    }

    #[wasm_bindgen(js_name = setOptions)]
    pub fn set_options(&mut self, options_json: &str) -> Result<(), JsError> {
        self.replace_options(options_json).map_err(|e| {
            console_error(&format!("Error updating layout options: {e}"));
            JsError::new(&e.to_string())
        })
    }

    /// Hide everything outside the named node's subtree.
    #[wasm_bindgen(js_name = expandToView)]
    pub fn expand_to_view(&mut self, name: &str) -> bool {
        self.hide_around(name)
    }

    #[wasm_bindgen(js_name = showAll)]
    pub fn show_all(&mut self) {
        let root = self.tree.root();
        self.tree.show_downward(root);
    }

    /// The current layout, without laying out again.
    pub fn output(&self) -> String {
        serialize(&LayoutOutput::from_tree(&self.tree))
    }
}

impl TileLayout {
    pub fn from_json(
        tol_json: &str,
        root: &str,
        depth: usize,
        options_json: &str,
    ) -> Result<Self, BindingError> {
        let tol: TolMap = serde_json::from_str(tol_json)
            .map_err(|source| BindingError::Json { what: "tree-of-life", source })?;
        let opts = parse_options(options_json)?;
        let tree = LayoutTree::from_tol(&tol, root, depth)?;
        Ok(Self { tol, tree, opts })
    }

    pub fn tree(&self) -> &LayoutTree {
        &self.tree
    }

    pub fn options(&self) -> &LayoutOptions {
        &self.opts
    }

    pub fn replace_options(&mut self, options_json: &str) -> Result<(), BindingError> {
        self.opts = parse_options(options_json)?;
        Ok(())
    }

    /// Lay out the tree, applying `edit` first. On failure the tree keeps
    /// its previous layout and structure.
    pub fn relayout(
        &mut self,
        edit: Option<Edit<'_>>,
        pos: PointF,
        dims: SizeF,
        allow_collapse: bool,
    ) -> Result<(), LayoutError> {
        let change = match edit {
            None => None,
            Some(Edit::Expand(name)) => Some(LayoutChange::Expand {
                node: self.node_named(name)?,
                tol: &self.tol,
            }),
            Some(Edit::Collapse(name)) => Some(LayoutChange::Collapse {
                node: self.node_named(name)?,
            }),
        };
        let mut opts = self.opts.clone();
        if opts.viewport_aspect.is_none() {
            opts.viewport_aspect = viewport_aspect();
        }
        let req = LayoutRequest { allow_collapse, change };
        try_layout(&mut self.tree, pos, dims, &opts, req)
    }

    pub fn hide_around(&mut self, name: &str) -> bool {
        let Some(id) = self.tree.find(name) else {
            return false;
        };
        self.tree.hide_upward(id);
        true
    }

    fn node_named(&self, name: &str) -> Result<NodeId, TreeError> {
        self.tree
            .find(name)
            .ok_or_else(|| TreeError::UnknownNode(name.to_string()))
    }

    #[allow(clippy::too_many_arguments)]
    fn respond(
        &mut self,
        edit: Option<Edit<'_>>,
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        allow_collapse: bool,
    ) -> String {
        let result = self.relayout(edit, PointF::new(x, y), SizeF::new(w, h), allow_collapse);
        let output = LayoutOutput::from_tree(&self.tree);
        match result {
            Ok(()) => serialize(&output),
            Err(e) => {
                console_error(&format!("Layout failed: {e}"));
                serialize(&output.with_error(&e))
            }
        }
    }
}

fn parse_options(options_json: &str) -> Result<LayoutOptions, BindingError> {
    let opts: LayoutOptions = serde_json::from_str(options_json)
        .map_err(|source| BindingError::Json { what: "layout options", source })?;
    opts.validate()?;
    Ok(opts)
}

fn serialize(output: &LayoutOutput) -> String {
    to_string(output).unwrap_or_else(|e| {
        format!(r#"{{"error":{{"kind":"serialization","message":"{e}"}}}}"#)
    })
}

#[cfg(target_arch = "wasm32")]
fn viewport_aspect() -> Option<f64> {
    let root = web_sys::window()?.document()?.document_element()?;
    let (w, h) = (root.client_width(), root.client_height());
    (w > 0 && h > 0).then(|| f64::from(w) / f64::from(h))
}

#[cfg(not(target_arch = "wasm32"))]
fn viewport_aspect() -> Option<f64> {
    None
}
