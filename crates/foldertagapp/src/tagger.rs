//! # Path Tagger
//!
//! Pure resolution of the tags a file *should* carry, given the rule set.
//! No I/O, no state, no failure modes: unmatched or ignored paths resolve to
//! an empty set.
//!
//! ## Resolution
//!
//! For `Health/Therapy/Notes/session.md` the folder chain is
//! `Health`, `Health/Therapy`, `Health/Therapy/Notes`, truncated to the first
//! `inherit_depth` levels. Walking that chain from the file upwards:
//!
//! 1. The **nearest** folder with a rule always contributes.
//! 2. While the rule just visited has `inherit_from_ancestors`, the next rule
//!    further up contributes as well. The walk is bounded by the chain.
//! 3. A visited rule contributes the folder-name tags picked by
//!    `folder_tag_levels` (root-most first), then its own `tags`. Only the
//!    own `tags` are gated by `apply_down_levels`, which must admit the
//!    file's level relative to the rule folder (1 = directly inside it).
//!
//! Contributions are unioned root-to-leaf, first occurrence wins. A folder
//! name tag is the alias list for that exact folder if one exists, otherwise
//! the normalized basename. Alias tags and explicit tags are unioned.
//!
//! There is no implicit tagging: with no rule in the chain the result is
//! empty.

use crate::model::FolderRule;
use crate::paths::{self, normalize_path};
use crate::rules::{FolderAliases, FolderRules};
use crate::tags::{normalize_all, normalize_tag, push_unique};
use serde::Serialize;

/// Tags contributed by one rule on the way to a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelTags {
    pub folder: String,
    pub depth: usize,
    pub tags: Vec<String>,
}

/// Borrowed view of everything resolution depends on.
#[derive(Debug, Clone, Copy)]
pub struct PathTagger<'a> {
    rules: &'a FolderRules,
    aliases: &'a FolderAliases,
    ignore_paths: &'a [String],
    inherit_depth: usize,
}

impl<'a> PathTagger<'a> {
    pub fn new(
        rules: &'a FolderRules,
        aliases: &'a FolderAliases,
        ignore_paths: &'a [String],
        inherit_depth: usize,
    ) -> Self {
        Self {
            rules,
            aliases,
            ignore_paths,
            inherit_depth,
        }
    }

    /// Ordered, deduplicated tag set for `path`.
    pub fn resolve(&self, path: &str) -> Vec<String> {
        let mut tags = Vec::new();
        for level in self.resolve_by_level(path) {
            for tag in level.tags {
                push_unique(&mut tags, tag);
            }
        }
        tags
    }

    /// Per-rule contributions, root-to-leaf. Rules that are visited but do
    /// not reach the file are omitted.
    pub fn resolve_by_level(&self, path: &str) -> Vec<LevelTags> {
        let path = normalize_path(path);
        let parent = paths::parent(&path);
        let parent_depth = paths::depth(parent);
        let chain = paths::folder_chain(parent);

        let mut levels: Vec<LevelTags> = self
            .walk(&path)
            .into_iter()
            .filter_map(|(depth, rule)| {
                let tags = self.contribution(rule, depth, parent_depth, &chain);
                if tags.is_empty() {
                    None
                } else {
                    Some(LevelTags {
                        folder: chain[depth - 1].clone(),
                        depth,
                        tags,
                    })
                }
            })
            .collect();
        levels.reverse();
        levels
    }

    /// The rule governing `path`, if any: the deepest rule folder within the
    /// depth limit, whether or not its level filter admits the file.
    pub fn nearest_rule(&self, path: &str) -> Option<(String, &'a FolderRule)> {
        let path = normalize_path(path);
        let chain = paths::folder_chain(paths::parent(&path));
        self.walk(&path)
            .into_iter()
            .next()
            .map(|(depth, rule)| (chain[depth - 1].clone(), rule))
    }

    pub fn is_ignored(&self, path: &str) -> bool {
        let path = normalize_path(path);
        self.ignore_paths
            .iter()
            .any(|ignored| paths::is_under(&path, &normalize_path(ignored)))
    }

    /// Rules visited for `path`, nearest first, as `(depth, rule)`.
    fn walk(&self, path: &str) -> Vec<(usize, &'a FolderRule)> {
        if self.is_ignored(path) {
            return Vec::new();
        }
        let chain = paths::folder_chain(paths::parent(path));
        let limit = chain.len().min(self.inherit_depth);

        let mut visited = Vec::new();
        for depth in (1..=limit).rev() {
            let Some(rule) = self.rules.get(&chain[depth - 1]) else {
                continue;
            };
            visited.push((depth, rule));
            if !rule.inherit_from_ancestors {
                break;
            }
        }
        visited
    }

    fn contribution(
        &self,
        rule: &FolderRule,
        depth: usize,
        parent_depth: usize,
        chain: &[String],
    ) -> Vec<String> {
        let mut tags = Vec::new();

        let mut levels = rule.folder_tag_levels.clone();
        levels.sort_unstable_by(|a, b| b.cmp(a));
        for level in levels {
            let level = level as usize;
            if level == 0 || level > depth {
                continue;
            }
            let folder = &chain[depth - level];
            for tag in self.folder_name_tags(folder) {
                push_unique(&mut tags, tag);
            }
        }

        let relative = parent_depth + 1 - depth;
        if rule.apply_down_levels.admits(relative) {
            for tag in normalize_all(&rule.tags) {
                push_unique(&mut tags, tag);
            }
        }
        tags
    }

    fn folder_name_tags(&self, folder: &str) -> Vec<String> {
        match self.aliases.get(folder) {
            Some(alias) => normalize_all(alias),
            None => normalize_tag(paths::basename(folder)).into_iter().collect(),
        }
    }
}

/// Free-function form of [`PathTagger::resolve`].
pub fn resolve_tags(
    path: &str,
    rules: &FolderRules,
    aliases: &FolderAliases,
    ignore_paths: &[String],
    inherit_depth: usize,
) -> Vec<String> {
    PathTagger::new(rules, aliases, ignore_paths, inherit_depth).resolve(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ApplyDownLevels;

    fn rules(entries: Vec<(&str, FolderRule)>) -> FolderRules {
        entries
            .into_iter()
            .map(|(folder, rule)| (folder.to_string(), rule))
            .collect()
    }

    fn resolve(rules: &FolderRules, path: &str, depth: usize) -> Vec<String> {
        resolve_tags(path, rules, &FolderAliases::new(), &[], depth)
    }

    #[test]
    fn test_no_rule_resolves_empty() {
        let rules = rules(vec![("Work", FolderRule::new(["work"]))]);
        assert!(resolve(&rules, "Health/Therapy/session.md", 10).is_empty());
        assert!(resolve(&rules, "root-note.md", 10).is_empty());
        assert!(resolve(&FolderRules::new(), "Work/x.md", 10).is_empty());
    }

    #[test]
    fn test_folder_levels_and_explicit_tags_union() {
        let rules = rules(vec![(
            "Health/Therapy",
            FolderRule::new(["therapy"]).with_folder_tag_levels(vec![1, 2]),
        )]);
        let tags = resolve(&rules, "Health/Therapy/Notes/session.md", 3);
        assert_eq!(tags, vec!["health", "therapy"]);
        assert_eq!(tags.iter().filter(|t| *t == "therapy").count(), 1);
    }

    #[test]
    fn test_rule_applies_to_direct_children() {
        let rules = rules(vec![("Work", FolderRule::new(["work"]))]);
        assert_eq!(resolve(&rules, "Work/todo.md", 10), vec!["work"]);
    }

    #[test]
    fn test_apply_down_levels_gate() {
        let rules = rules(vec![(
            "Projects",
            FolderRule::new(["project"]).with_apply_down(ApplyDownLevels::Levels(vec![2])),
        )]);
        assert!(resolve(&rules, "Projects/readme.md", 10).is_empty());
        assert_eq!(
            resolve(&rules, "Projects/Alpha/plan.md", 10),
            vec!["project"]
        );
        assert!(resolve(&rules, "Projects/Alpha/Docs/spec.md", 10).is_empty());
    }

    #[test]
    fn test_apply_down_levels_do_not_gate_folder_names() {
        let rules = rules(vec![(
            "Projects",
            FolderRule::new(["project"])
                .with_folder_tag_levels(vec![1])
                .with_apply_down(ApplyDownLevels::Levels(vec![2])),
        )]);
        assert_eq!(resolve(&rules, "Projects/readme.md", 10), vec!["projects"]);
        assert_eq!(
            resolve(&rules, "Projects/Alpha/plan.md", 10),
            vec!["projects", "project"]
        );
    }

    #[test]
    fn test_nearest_rule_shadows_without_inheritance() {
        let rules = rules(vec![
            ("Work", FolderRule::new(["work"])),
            ("Work/Clients", FolderRule::new(["client"])),
        ]);
        assert_eq!(resolve(&rules, "Work/Clients/acme.md", 10), vec!["client"]);
        assert_eq!(resolve(&rules, "Work/notes.md", 10), vec!["work"]);
    }

    #[test]
    fn test_inheritance_chains_root_to_leaf() {
        let rules = rules(vec![
            ("Work", FolderRule::new(["work"])),
            ("Work/Clients", FolderRule::new(["client"]).inheriting()),
            ("Work/Clients/Acme", FolderRule::new(["acme"]).inheriting()),
        ]);
        assert_eq!(
            resolve(&rules, "Work/Clients/Acme/call.md", 10),
            vec!["work", "client", "acme"]
        );
    }

    #[test]
    fn test_inheritance_stops_at_non_inheriting_rule() {
        let rules = rules(vec![
            ("A", FolderRule::new(["a"])),
            ("A/B", FolderRule::new(["b"])),
            ("A/B/C", FolderRule::new(["c"]).inheriting()),
        ]);
        assert_eq!(resolve(&rules, "A/B/C/x.md", 10), vec!["b", "c"]);
    }

    #[test]
    fn test_inherit_depth_truncates_chain() {
        let rules = rules(vec![
            ("A", FolderRule::new(["a"])),
            ("A/B/C", FolderRule::new(["c"]).inheriting()),
        ]);
        // Depth 2 hides the rule at A/B/C, so A governs.
        assert_eq!(resolve(&rules, "A/B/C/x.md", 2), vec!["a"]);
        assert_eq!(resolve(&rules, "A/B/C/x.md", 3), vec!["a", "c"]);
    }

    #[test]
    fn test_ignore_paths() {
        let rules = rules(vec![("Work", FolderRule::new(["work"]))]);
        let ignore = vec!["Work/Archive/".to_string()];
        let aliases = FolderAliases::new();
        let tagger = PathTagger::new(&rules, &aliases, &ignore, 10);
        assert!(tagger.resolve("Work/Archive/old.md").is_empty());
        assert!(tagger.resolve("Work/Archive").is_empty());
        assert_eq!(tagger.resolve("Work/Archived/old.md"), vec!["work"]);
    }

    #[test]
    fn test_alias_replaces_folder_name() {
        let rules = rules(vec![(
            "Personal Finance",
            FolderRule::new(["money"]).with_folder_tag_levels(vec![1]),
        )]);
        let mut aliases = FolderAliases::new();
        aliases.insert(
            "Personal Finance".to_string(),
            vec!["finance".to_string(), "budget".to_string()],
        );
        let tags = resolve_tags("Personal Finance/2024.md", &rules, &aliases, &[], 10);
        assert_eq!(tags, vec!["finance", "budget", "money"]);

        let tags = resolve(&rules, "Personal Finance/2024.md", 10);
        assert_eq!(tags, vec!["personal-finance", "money"]);
    }

    #[test]
    fn test_alias_and_explicit_tag_union_not_override() {
        let rules = rules(vec![(
            "Work",
            FolderRule::new(["work"]).with_folder_tag_levels(vec![1]),
        )]);
        let mut aliases = FolderAliases::new();
        aliases.insert("Work".to_string(), vec!["job".to_string(), "work".to_string()]);
        let tags = resolve_tags("Work/x.md", &rules, &aliases, &[], 10);
        assert_eq!(tags, vec!["job", "work"]);
    }

    #[test]
    fn test_folder_level_beyond_root_is_ignored() {
        let rules = rules(vec![(
            "Work",
            FolderRule::new(Vec::<String>::new()).with_folder_tag_levels(vec![1, 5]),
        )]);
        assert_eq!(resolve(&rules, "Work/x.md", 10), vec!["work"]);
    }

    #[test]
    fn test_resolve_by_level_reports_contributions() {
        let rules = rules(vec![
            ("Work", FolderRule::new(["work"])),
            ("Work/Clients", FolderRule::new(["client"]).inheriting()),
        ]);
        let aliases = FolderAliases::new();
        let tagger = PathTagger::new(&rules, &aliases, &[], 10);
        let levels = tagger.resolve_by_level("Work/Clients/acme.md");
        assert_eq!(levels.len(), 2);
        assert_eq!(levels[0].folder, "Work");
        assert_eq!(levels[0].depth, 1);
        assert_eq!(levels[1].folder, "Work/Clients");
        assert_eq!(levels[1].tags, vec!["client"]);
    }

    #[test]
    fn test_nearest_rule() {
        let rules = rules(vec![
            ("Work", FolderRule::new(["work"])),
            ("Work/Inbox", FolderRule::new(["inbox"]).for_new_files()),
        ]);
        let aliases = FolderAliases::new();
        let tagger = PathTagger::new(&rules, &aliases, &[], 10);
        let (folder, rule) = tagger.nearest_rule("Work/Inbox/Deep/x.md").unwrap();
        assert_eq!(folder, "Work/Inbox");
        assert!(rule.apply_to_new_files);
        assert!(tagger.nearest_rule("Home/x.md").is_none());
    }

    #[test]
    fn test_resolution_is_deterministic_and_unique() {
        let rules = rules(vec![
            (
                "A",
                FolderRule::new(["shared", "a"]).with_folder_tag_levels(vec![1]),
            ),
            (
                "A/B",
                FolderRule::new(["shared", "b"])
                    .with_folder_tag_levels(vec![1, 2])
                    .inheriting(),
            ),
        ]);
        let first = resolve(&rules, "A/B/x.md", 10);
        let second = resolve(&rules, "A/B/x.md", 10);
        assert_eq!(first, second);
        assert_eq!(first, vec!["a", "shared", "b"]);
    }
}
