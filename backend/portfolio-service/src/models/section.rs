use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::{IntoParams, ToSchema};

/// Section database entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Section {
    pub id: i32,
    pub name: String,
    /// Slash separated location, e.g. `travel/japan/tokyo`
    pub path: String,
    pub parent_id: Option<i32>,
}

/// A section with its descendants nested beneath it
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SectionNode {
    pub id: i32,
    pub name: String,
    pub path: String,
    pub children: Vec<SectionNode>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct SectionPathQuery {
    pub path: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct SectionIdQuery {
    pub section_id: Option<i32>,
}

/// Nest a flat section list by `parent_id`.
///
/// Sections whose parent is absent from the list become roots. Siblings keep
/// the order of the input.
pub fn build_section_tree(sections: Vec<Section>) -> Vec<SectionNode> {
    let known: std::collections::HashSet<i32> = sections.iter().map(|s| s.id).collect();

    let mut roots = Vec::new();
    let mut by_parent: HashMap<i32, Vec<Section>> = HashMap::new();
    for section in sections {
        match section.parent_id {
            Some(parent) if parent != section.id && known.contains(&parent) => {
                by_parent.entry(parent).or_default().push(section)
            }
            _ => roots.push(section),
        }
    }

    // sections caught in a parent cycle are unreachable from any root and are dropped
    roots
        .into_iter()
        .map(|root| attach_children(root, &mut by_parent))
        .collect()
}

fn attach_children(section: Section, by_parent: &mut HashMap<i32, Vec<Section>>) -> SectionNode {
    let children = by_parent
        .remove(&section.id)
        .unwrap_or_default()
        .into_iter()
        .map(|child| attach_children(child, by_parent))
        .collect();

    SectionNode {
        id: section.id,
        name: section.name,
        path: section.path,
        children,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(id: i32, path: &str, parent_id: Option<i32>) -> Section {
        Section {
            id,
            name: path.rsplit('/').next().unwrap_or(path).to_string(),
            path: path.to_string(),
            parent_id,
        }
    }

    #[test]
    fn test_builds_nested_tree() {
        let tree = build_section_tree(vec![
            section(1, "travel", None),
            section(2, "travel/japan", Some(1)),
            section(3, "travel/japan/tokyo", Some(2)),
            section(4, "portraits", None),
            section(5, "travel/peru", Some(1)),
        ]);

        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].path, "travel");
        assert_eq!(
            tree[0].children.iter().map(|c| c.id).collect::<Vec<_>>(),
            vec![2, 5]
        );
        assert_eq!(tree[0].children[0].children[0].name, "tokyo");
        assert!(tree[1].children.is_empty());
    }

    #[test]
    fn test_orphans_become_roots() {
        let tree = build_section_tree(vec![section(7, "lost/child", Some(99))]);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].id, 7);
    }

    #[test]
    fn test_self_parent_is_a_root() {
        let tree = build_section_tree(vec![section(1, "loop", Some(1))]);
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_empty_list() {
        assert!(build_section_tree(Vec::new()).is_empty());
    }
}
