use roxmltree::Node;

use crate::source::{
    AbstractNumbering, LevelDefinition, LevelOverride, NumberingDefinitions, NumberingInstance,
};

use super::props::{paragraph_props, run_props};
use super::styles::ThemeFonts;
use super::{WML_NS, is_wml, wml, wml_attr};

fn ilvl(node: Node) -> Option<u8> {
    node.attribute((WML_NS, "ilvl"))
        .and_then(|v| v.trim().parse::<u8>().ok())
}

fn level_definition(lvl: Node, theme: &ThemeFonts) -> LevelDefinition {
    LevelDefinition {
        format: wml_attr(lvl, "numFmt").map(str::to_string),
        start: wml_attr(lvl, "start").and_then(|v| v.trim().parse::<u32>().ok()),
        text: wml_attr(lvl, "lvlText").map(str::to_string),
        justification: wml_attr(lvl, "lvlJc").map(str::to_string),
        suffix: wml_attr(lvl, "suff").map(str::to_string),
        paragraph: wml(lvl, "pPr").map(paragraph_props).unwrap_or_default(),
        run: wml(lvl, "rPr")
            .map(|rpr| run_props(rpr, theme))
            .unwrap_or_default(),
    }
}

fn abstract_numbering(node: Node, theme: &ThemeFonts) -> AbstractNumbering {
    let mut levels = std::collections::BTreeMap::new();
    for lvl in node.children().filter(|n| is_wml(*n, "lvl")) {
        let Some(level) = ilvl(lvl) else {
            continue;
        };
        levels.insert(level, level_definition(lvl, theme));
    }
    AbstractNumbering { levels }
}

fn numbering_instance(node: Node, theme: &ThemeFonts) -> Option<NumberingInstance> {
    let abstract_id = wml_attr(node, "abstractNumId")?.to_string();
    let mut instance = NumberingInstance {
        abstract_id,
        ..Default::default()
    };
    for ov in node.children().filter(|n| is_wml(*n, "lvlOverride")) {
        let Some(level) = ilvl(ov) else {
            continue;
        };
        instance.overrides.insert(
            level,
            LevelOverride {
                start: wml_attr(ov, "startOverride").and_then(|v| v.trim().parse::<u32>().ok()),
                level: wml(ov, "lvl").map(|lvl| level_definition(lvl, theme)),
            },
        );
    }
    Some(instance)
}

/// `word/numbering.xml`: abstract definitions and the `w:num` instances
/// pointing at them.
pub(super) fn parse_numbering(xml_content: Option<&str>, theme: &ThemeFonts) -> NumberingDefinitions {
    let mut defs = NumberingDefinitions::default();
    let Some(xml_content) = xml_content else {
        return defs;
    };
    let xml = match roxmltree::Document::parse(xml_content) {
        Ok(xml) => xml,
        Err(e) => {
            log::warn!("Ignoring malformed numbering part: {e}");
            return defs;
        }
    };

    for node in xml.root_element().children() {
        if node.tag_name().namespace() != Some(WML_NS) {
            continue;
        }
        match node.tag_name().name() {
            "abstractNum" => {
                let Some(abs_id) = node.attribute((WML_NS, "abstractNumId")) else {
                    continue;
                };
                defs.abstracts
                    .insert(abs_id.to_string(), abstract_numbering(node, theme));
            }
            "num" => {
                let Some(num_id) = node.attribute((WML_NS, "numId")) else {
                    continue;
                };
                match numbering_instance(node, theme) {
                    Some(instance) => {
                        defs.instances.insert(num_id.to_string(), instance);
                    }
                    None => log::debug!("Numbering instance {num_id} has no abstractNumId"),
                }
            }
            _ => {}
        }
    }

    defs
}
