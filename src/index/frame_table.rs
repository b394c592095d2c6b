//! Reference grid (frame table) reading

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::model::{Axis, ReferenceGridEntry, element_guid};
use crate::parser::{Element, NodeId, numeric_value};
use crate::schema::Tags;

/// Read the X, Y and Z reference-plane groups of a frame table
///
/// Entries come back in document order together with the node of their
/// reference plane. Planes without a GUID or without a readable location
/// are reported and skipped.
pub(crate) fn read_reference_grid(
    table: Element<'_>,
    tags: &Tags,
    diagnostics: &mut Diagnostics,
) -> Vec<(NodeId, ReferenceGridEntry)> {
    let mut entries = Vec::new();
    let groups = [
        (&tags.xrefplanes, Axis::X),
        (&tags.yrefplanes, Axis::Y),
        (&tags.zrefplanes, Axis::Z),
    ];

    for (group_tag, axis) in groups {
        let Some(group) = table.child(group_tag) else {
            diagnostics.info(
                DiagnosticKind::MissingOptionalElement,
                &table,
                format!("has no {} reference planes", axis),
            );
            continue;
        };

        for plane in group.children().filter(|c| c.is(&tags.refplane)) {
            let Some(guid) = element_guid(plane, tags) else {
                diagnostics.warn(
                    DiagnosticKind::MissingOptionalElement,
                    &plane,
                    "reference plane has no GUID, skipped",
                );
                continue;
            };
            let position = plane
                .child(&tags.referencelocation)
                .ok_or_else(|| "has no reference location".to_string())
                .and_then(|loc| numeric_value(loc).map_err(|e| e.to_string()));
            match position {
                Ok(position) => entries.push((
                    plane.id(),
                    ReferenceGridEntry {
                        guid,
                        axis,
                        position,
                    },
                )),
                Err(reason) => diagnostics.warn(
                    DiagnosticKind::MissingOptionalElement,
                    &plane,
                    format!("{}, skipped", reason),
                ),
            }
        }
    }
    entries
}
