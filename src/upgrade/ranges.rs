//! v2 `structures` to a v3 range tree.
//!
//! v2 ranges form a flat list linked by id: `ranges`/`canvases` (or the
//! ordered `members`) name the children, `within` names the parent. v3
//! nests child ranges in `items`.

use std::collections::{HashMap, HashSet};

use serde_json::{json, Map, Value};

use super::{as_object, reference, string_values, upgrade_descriptive, v2_id, v3_type};
use crate::error::IiifError;

struct RangeNode<'a> {
    object: &'a Map<String, Value>,
    children: Vec<(&'a str, &'static str)>,
}

pub(super) fn upgrade_structures(ranges: &[Value]) -> Result<Vec<Value>, IiifError> {
    let mut nodes: Vec<(&str, RangeNode<'_>)> = Vec::new();
    for range in ranges {
        let object = as_object(range, "range")?;
        let Some(id) = v2_id(object) else {
            continue;
        };
        nodes.push((
            id,
            RangeNode {
                object,
                children: declared_children(object),
            },
        ));
    }

    // Ranges that only declare their parent through `within`.
    let known: HashSet<&str> = nodes.iter().map(|(id, _)| *id).collect();
    let mut adopted: Vec<(&str, &str)> = Vec::new();
    for (id, node) in &nodes {
        if let Some(parents) = node.object.get("within").map(string_values) {
            for parent in parents.into_iter().filter(|parent| known.contains(parent)) {
                adopted.push((parent, *id));
            }
        }
    }
    for (parent, child) in adopted {
        if let Some((_, node)) = nodes.iter_mut().find(|(id, _)| *id == parent) {
            if !node.children.iter().any(|(id, _)| *id == child) {
                node.children.push((child, "Range"));
            }
        }
    }

    let referenced: HashSet<&str> = nodes
        .iter()
        .flat_map(|(_, node)| node.children.iter())
        .filter(|(_, kind)| *kind == "Range")
        .map(|(id, _)| *id)
        .collect();
    let marked_top: Vec<&str> = nodes
        .iter()
        .filter(|(_, node)| is_top(node.object))
        .map(|(id, _)| *id)
        .collect();
    let roots: Vec<&str> = if marked_top.is_empty() {
        nodes
            .iter()
            .map(|(id, _)| *id)
            .filter(|id| !referenced.contains(id))
            .collect()
    } else {
        marked_top
    };

    let index: HashMap<&str, &RangeNode<'_>> =
        nodes.iter().map(|(id, node)| (*id, node)).collect();
    let mut path = Vec::new();
    Ok(roots
        .into_iter()
        .map(|root| build_range(root, &index, &mut path))
        .collect())
}

fn is_top(object: &Map<String, Value>) -> bool {
    object
        .get("viewingHint")
        .map(string_values)
        .is_some_and(|hints| hints.contains(&"top"))
}

fn declared_children(object: &Map<String, Value>) -> Vec<(&str, &'static str)> {
    if let Some(members) = object.get("members").and_then(Value::as_array) {
        return members
            .iter()
            .filter_map(|member| {
                let member = member.as_object()?;
                let kind = match v3_type(member).as_deref() {
                    Some("Range") => "Range",
                    _ => "Canvas",
                };
                Some((v2_id(member)?, kind))
            })
            .collect();
    }

    let mut children = Vec::new();
    if let Some(canvases) = object.get("canvases") {
        children.extend(string_values(canvases).into_iter().map(|id| (id, "Canvas")));
    }
    if let Some(ranges) = object.get("ranges") {
        children.extend(string_values(ranges).into_iter().map(|id| (id, "Range")));
    }
    children
}

fn build_range<'a>(
    id: &'a str,
    index: &HashMap<&'a str, &RangeNode<'a>>,
    path: &mut Vec<&'a str>,
) -> Value {
    let Some(node) = index.get(id) else {
        return reference(id, "Range");
    };
    if path.contains(&id) {
        return reference(id, "Range");
    }

    path.push(id);
    let items: Vec<Value> = node
        .children
        .iter()
        .map(|(child, kind)| match *kind {
            "Range" => build_range(*child, index, path),
            _ => reference(child, "Canvas"),
        })
        .collect();
    path.pop();

    let mut range = upgrade_descriptive(node.object);
    range.insert("type".to_string(), json!("Range"));
    range.remove("behavior");
    range.insert("items".to_string(), Value::Array(items));
    Value::Object(range)
}
