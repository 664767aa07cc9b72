//! Construction tests for the build graph.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::io;
use std::sync::{Arc, Mutex};

use proptest::prelude::*;
use tracing_subscriber::fmt::MakeWriter;

use super::*;
use crate::stats::{
    BuildRows, NativeChunkId, RawAsset, RawChunk, RawConcatenatedModule, RawModule,
    RawNamedChunkGroup, RawReason, Row,
};

fn module(id: u64, identifier: Option<&str>, chunks: &[u64], reasons: &[(&str, Option<&str>)]) -> Row<RawModule> {
    Row::new(
        id,
        1,
        RawModule {
            identifier: identifier.map(str::to_string),
            name: identifier.map(|i| format!("./{i}")),
            size: 100,
            chunks: chunks.iter().map(|&c| NativeChunkId::Number(c)).collect(),
            reasons: reasons
                .iter()
                .map(|&(reason_type, parent)| RawReason::new(reason_type, parent))
                .collect(),
            ..Default::default()
        },
    )
}

fn chunk(id: u64, native: u64, entry: bool) -> Row<RawChunk> {
    Row::new(
        id,
        1,
        RawChunk {
            id: Some(NativeChunkId::Number(native)),
            size: 1000,
            entry,
            ..Default::default()
        },
    )
}

fn ids(values: &[u64]) -> Vec<NativeChunkId> {
    values.iter().map(|&v| NativeChunkId::Number(v)).collect()
}

fn build(rows: &BuildRows) -> BuildGraph {
    GraphBuilder::default().build(rows).unwrap()
}

#[test]
fn test_cjs_require_scenario() {
    let rows = BuildRows {
        modules: vec![
            module(10, Some("a"), &[1], &[("entry", None)]),
            module(20, Some("b"), &[1], &[("cjs require", Some("a"))]),
        ],
        chunks: vec![chunk(5, 1, true)],
        ..Default::default()
    };

    let graph = build(&rows);
    let m1 = graph.module(10).unwrap();
    let m2 = graph.module(20).unwrap();

    assert!(m1.is_entry);
    assert!(!m2.is_entry);
    let edge = graph.relationship(10, 20).unwrap();
    assert_eq!(edge.reasons.len(), 1);
    assert_eq!(edge.reasons[0].reason_type, "cjs require");
    assert!(!edge.reasons[0].is_lazy);

    assert_eq!(m1.path_from_entry, vec![10]);
    assert_eq!(m2.path_from_entry, vec![10, 20]);
    assert_eq!(m1.child_module_ids, BTreeSet::from([20]));
    assert_eq!(m2.parent_module_ids, BTreeSet::from([10]));

    assert!(m1.parent_chunk_ids.contains(&5));
    assert!(m2.parent_chunk_ids.contains(&5));
    assert_eq!(graph.chunk(5).unwrap().child_module_ids, BTreeSet::from([10, 20]));
}

#[test]
fn test_concatenation_scenario() {
    let mut super_row = module(1, Some("sup"), &[1], &[]);
    super_row.raw_payload.size = 150;
    super_row.raw_payload.modules = vec![
        RawConcatenatedModule {
            identifier: Some("sup".to_string()),
            size: 100,
            ..Default::default()
        },
        RawConcatenatedModule {
            identifier: Some("sub1".to_string()),
            size: 50,
            ..Default::default()
        },
    ];
    let mut sub_row = module(2, Some("sub1"), &[], &[]);
    sub_row.raw_payload.size = 50;

    let rows = BuildRows {
        modules: vec![super_row, sub_row],
        chunks: vec![chunk(7, 1, true)],
        ..Default::default()
    };

    let graph = build(&rows);
    let super_module = graph.module(1).unwrap();
    let sub_module = graph.module(2).unwrap();

    assert!(super_module.is_super_module);
    assert!(!super_module.is_sub_module);
    assert!(sub_module.is_sub_module);
    assert_eq!(super_module.inner_concatenated_module_ids, BTreeSet::from([2]));
    assert_eq!(sub_module.super_module_ids, BTreeSet::from([1]));
    assert!(sub_module.parent_chunk_ids.is_empty());
    assert_eq!(sub_module.parent_chunk_ids_from_super_module, BTreeSet::from([7]));

    let c1 = graph.chunk(7).unwrap();
    assert_eq!(c1.child_submodule_ids, BTreeSet::from([2]));
    assert_eq!(c1.child_module_ids, BTreeSet::from([1]));

    assert_eq!(graph.chunks_containing_module(2), BTreeSet::from([7]));
    assert_eq!(graph.individual_size(1), Some(100));
    assert_eq!(graph.individual_size(2), Some(50));
}

#[test]
fn test_concatenated_list_with_only_itself_is_ordinary() {
    let mut row = module(1, Some("a"), &[1], &[]);
    row.raw_payload.modules = vec![RawConcatenatedModule {
        identifier: Some("a".to_string()),
        size: 100,
        ..Default::default()
    }];

    let graph = build(&BuildRows {
        modules: vec![row],
        chunks: vec![chunk(1, 1, true)],
        ..Default::default()
    });

    let node = graph.module(1).unwrap();
    assert!(!node.is_super_module);
    assert!(node.inner_concatenated_module_ids.is_empty());
}

#[test]
fn test_missing_concatenated_module_is_fatal() {
    let mut row = module(1, Some("sup"), &[1], &[]);
    row.raw_payload.modules = vec![
        RawConcatenatedModule {
            identifier: Some("sup".to_string()),
            ..Default::default()
        },
        RawConcatenatedModule {
            identifier: Some("ghost".to_string()),
            ..Default::default()
        },
    ];

    let result = GraphBuilder::default().build(&BuildRows {
        modules: vec![row],
        chunks: vec![chunk(1, 1, true)],
        ..Default::default()
    });

    assert_eq!(
        result.unwrap_err(),
        GraphError::MissingConcatenatedModule {
            identifier: "ghost".to_string(),
            super_module_id: 1,
        }
    );
}

#[test]
fn test_reason_identifier_suffix_is_stripped() {
    let rows = BuildRows {
        modules: vec![
            module(1, Some("a"), &[], &[("entry", None)]),
            module(2, Some("b"), &[], &[("harmony import specifier", Some("a|xyz123"))]),
        ],
        ..Default::default()
    };

    let graph = build(&rows);
    assert!(graph.relationship(1, 2).is_some());
    assert_eq!(graph.module(2).unwrap().path_from_entry, vec![1, 2]);
}

#[test]
fn test_typed_identifiers_keep_distinct_keys() {
    let rows = BuildRows {
        modules: vec![
            module(1, Some("/app/index.js"), &[], &[("entry", None)]),
            module(2, Some("json|/app/a.json"), &[], &[("cjs require", Some("/app/index.js"))]),
            module(3, Some("json|/app/b.json"), &[], &[]),
            module(4, Some("/app/reader.js"), &[], &[("cjs require", Some("json|/app/a.json"))]),
        ],
        ..Default::default()
    };

    let graph = build(&rows);
    assert_eq!(graph.module(2).unwrap().key.as_str(), "json|/app/a.json");
    assert_eq!(graph.module(3).unwrap().key.as_str(), "json|/app/b.json");
    assert_eq!(graph.module_by_identifier("json|/app/b.json").unwrap().id, 3);

    let reader = graph.module(4).unwrap();
    assert_eq!(reader.parent_module_ids, BTreeSet::from([2]));
    assert_eq!(reader.path_from_entry, vec![1, 2, 4]);
}

#[test]
fn test_modules_without_identifier_never_link() {
    let rows = BuildRows {
        modules: vec![
            module(1, None, &[], &[("entry", None)]),
            module(2, None, &[], &[("cjs require", None)]),
        ],
        chunks: vec![Row::new(3, 1, RawChunk::default())],
        ..Default::default()
    };

    let graph = build(&rows);
    assert_eq!(graph.relationships().count(), 0);
    assert!(graph.module(2).unwrap().parent_module_ids.is_empty());
    assert!(graph.module(2).unwrap().path_from_entry.is_empty());
    assert!(graph.module_by_key(&NativeKey::module(None)).is_none());
    assert!(graph.chunk_by_key(&NativeKey::chunk(None)).is_none());
}

#[test]
fn test_unknown_reason_type_is_fatal() {
    let rows = BuildRows {
        modules: vec![
            module(1, Some("a"), &[], &[]),
            module(2, Some("b"), &[], &[("teleport", Some("a"))]),
        ],
        ..Default::default()
    };

    let err = GraphBuilder::default().build(&rows).unwrap_err();
    assert_eq!(
        err,
        GraphError::UnknownReasonType {
            reason_type: "teleport".to_string(),
            module_id: 2,
        }
    );
    assert!(err.to_string().contains("teleport"));
}

#[test]
fn test_configured_reason_type_is_accepted() {
    let rows = BuildRows {
        modules: vec![
            module(1, Some("a"), &[], &[]),
            module(2, Some("b"), &[], &[("teleport", Some("a"))]),
        ],
        ..Default::default()
    };

    let mut overrides = BTreeMap::new();
    overrides.insert("teleport".to_string(), ReasonBehavior::Lazy);
    let graph = GraphBuilder::new(ReasonTable::with_overrides(&overrides))
        .build(&rows)
        .unwrap();

    assert!(graph.relationship(1, 2).unwrap().is_lazy_only());
}

#[test]
fn test_unresolved_references_are_skipped() {
    let rows = BuildRows {
        modules: vec![
            module(1, Some("a"), &[1, 99], &[("entry", None)]),
            module(2, Some("b"), &[1], &[("cjs require", Some("nowhere")), ("cjs require", Some("a"))]),
        ],
        chunks: vec![chunk(1, 1, true)],
        named_chunk_groups: vec![Row::new(
            1,
            1,
            RawNamedChunkGroup {
                name: "main".to_string(),
                chunks: ids(&[1, 42]),
            },
        )],
        assets: vec![Row::new(
            1,
            1,
            RawAsset {
                name: "main.js".to_string(),
                size: 10,
                chunks: ids(&[1, 77]),
            },
        )],
    };

    let graph = build(&rows);
    assert_eq!(graph.module(1).unwrap().parent_chunk_ids, BTreeSet::from([1]));
    assert_eq!(graph.module(2).unwrap().parent_module_ids, BTreeSet::from([1]));
    assert_eq!(graph.named_chunk_group(1).unwrap().chunk_ids, BTreeSet::from([1]));
    assert_eq!(graph.asset(1).unwrap().chunk_ids, BTreeSet::from([1]));
}

#[test]
fn test_repeated_causes_share_one_relationship() {
    let rows = BuildRows {
        modules: vec![
            module(1, Some("a"), &[], &[("entry", None)]),
            module(
                2,
                Some("b"),
                &[],
                &[
                    ("harmony side effect evaluation", Some("a")),
                    ("harmony import specifier", Some("a")),
                    ("import()", Some("a|chunk")),
                ],
            ),
        ],
        ..Default::default()
    };

    let graph = build(&rows);
    assert_eq!(graph.relationships().count(), 1);

    let edge = graph.relationship(1, 2).unwrap();
    let types: Vec<_> = edge.reasons.iter().map(|r| r.reason_type.as_str()).collect();
    assert_eq!(
        types,
        vec!["harmony side effect evaluation", "harmony import specifier", "import()"]
    );
    assert_eq!(
        edge.reasons.iter().map(|r| r.is_lazy).collect::<Vec<_>>(),
        vec![false, false, true]
    );
    assert_eq!(graph.child_relationships(1), vec![edge]);
    assert_eq!(graph.parent_relationships(2), vec![edge]);
}

#[test]
fn test_reason_types_are_collected() {
    let rows = BuildRows {
        modules: vec![
            module(1, Some("a"), &[], &[("entry", None)]),
            module(2, Some("b"), &[], &[("cjs require", Some("a")), ("import()", Some("missing"))]),
        ],
        ..Default::default()
    };

    let graph = build(&rows);
    let types: Vec<_> = graph.reason_types().iter().map(String::as_str).collect();
    assert_eq!(types, vec!["cjs require", "entry", "import()"]);
}

#[test]
fn test_shortest_path_and_unreachable_modules() {
    let rows = BuildRows {
        modules: vec![
            module(1, Some("entry"), &[], &[("entry", None)]),
            module(2, Some("x"), &[], &[("cjs require", Some("entry"))]),
            module(3, Some("y"), &[], &[("cjs require", Some("x"))]),
            module(4, Some("z"), &[], &[("cjs require", Some("y")), ("cjs require", Some("entry"))]),
            module(5, Some("island"), &[], &[("cjs require", Some("island2"))]),
            module(6, Some("island2"), &[], &[]),
        ],
        ..Default::default()
    };

    let graph = build(&rows);
    assert_eq!(graph.module(4).unwrap().path_from_entry, vec![1, 4]);
    assert_eq!(graph.module(3).unwrap().path_from_entry, vec![1, 2, 3]);
    assert!(graph.module(5).unwrap().path_from_entry.is_empty());
    assert!(graph.module(6).unwrap().path_from_entry.is_empty());
    assert_eq!(graph.summary().unreachable_module_count, 2);
}

#[test]
fn test_named_chunk_group_totals() {
    let mut big = chunk(2, 2, false);
    big.raw_payload.size = 2500;
    let rows = BuildRows {
        modules: vec![module(1, Some("a"), &[1], &[("entry", None)])],
        chunks: vec![chunk(1, 1, true), big],
        named_chunk_groups: vec![Row::new(
            9,
            1,
            RawNamedChunkGroup {
                name: "main".to_string(),
                chunks: ids(&[1, 2, 1]),
            },
        )],
        ..Default::default()
    };

    let graph = build(&rows);
    let group = graph.named_chunk_group_by_name("main").unwrap();
    assert_eq!(group.chunk_ids, BTreeSet::from([1, 2]));
    assert_eq!(group.total_size, 3500);

    assert_eq!(graph.chunk(1).unwrap().named_chunk_group_ids, BTreeSet::from([9]));
    assert_eq!(graph.module(1).unwrap().named_chunk_group_ids, BTreeSet::from([9]));
}

#[test]
fn test_chunk_topology() {
    let mut main = chunk(1, 0, true);
    main.raw_payload.children = ids(&[1]);
    main.raw_payload.siblings = ids(&[3]);
    let mut lazy = chunk(2, 1, false);
    lazy.raw_payload.children = ids(&[2]);
    let grandchild = chunk(3, 2, false);
    let mut vendor = chunk(4, 3, false);
    vendor.raw_payload.parents = ids(&[2]);
    let orphan = chunk(5, 4, false);

    let graph = build(&BuildRows {
        chunks: vec![main, lazy, grandchild, vendor, orphan],
        ..Default::default()
    });

    let main = graph.chunk(1).unwrap();
    assert_eq!(main.child_chunk_ids, BTreeSet::from([2]));
    assert_eq!(main.sibling_chunk_ids, BTreeSet::from([4]));
    assert_eq!(graph.chunk(4).unwrap().sibling_chunk_ids, BTreeSet::from([1]));

    // Reported only as a parent on the child side.
    assert_eq!(graph.chunk(3).unwrap().child_chunk_ids, BTreeSet::from([4]));
    assert_eq!(graph.chunk(4).unwrap().parent_chunk_ids, BTreeSet::from([3]));

    assert_eq!(main.path_from_entry, vec![1]);
    assert_eq!(graph.chunk(3).unwrap().path_from_entry, vec![1, 2, 3]);
    assert_eq!(graph.chunk(4).unwrap().path_from_entry, vec![1, 2, 3, 4]);
    assert!(graph.chunk(5).unwrap().path_from_entry.is_empty());
    assert_eq!(graph.entry_chunks().count(), 1);
}

#[test]
fn test_asset_aggregation() {
    let mut super_row = module(1, Some("sup"), &[1], &[("entry", None)]);
    super_row.raw_payload.modules = vec![
        RawConcatenatedModule {
            identifier: Some("sup".to_string()),
            size: 60,
            ..Default::default()
        },
        RawConcatenatedModule {
            identifier: Some("inner".to_string()),
            size: 40,
            ..Default::default()
        },
    ];

    let rows = BuildRows {
        modules: vec![
            super_row,
            module(2, Some("inner"), &[], &[]),
            module(3, Some("lazy"), &[2], &[("import()", Some("sup"))]),
        ],
        chunks: vec![chunk(1, 1, true), chunk(2, 2, false)],
        named_chunk_groups: vec![Row::new(
            1,
            1,
            RawNamedChunkGroup {
                name: "main".to_string(),
                chunks: ids(&[1]),
            },
        )],
        assets: vec![
            Row::new(
                1,
                1,
                RawAsset {
                    name: "main.js".to_string(),
                    size: 100,
                    chunks: ids(&[1]),
                },
            ),
            Row::new(
                2,
                1,
                RawAsset {
                    name: "lazy.js".to_string(),
                    size: 50,
                    chunks: ids(&[2]),
                },
            ),
        ],
    };

    let graph = build(&rows);
    let main = graph.asset_by_name("main.js").unwrap();
    assert_eq!(main.chunk_ids, BTreeSet::from([1]));
    assert_eq!(main.module_ids, BTreeSet::from([1]));
    assert_eq!(main.sub_module_ids, BTreeSet::from([2]));
    assert_eq!(main.named_chunk_group_ids, BTreeSet::from([1]));

    let lazy = graph.asset(2).unwrap();
    assert_eq!(lazy.module_ids, BTreeSet::from([3]));
    assert!(lazy.sub_module_ids.is_empty());
    assert!(lazy.named_chunk_group_ids.is_empty());

    let names: Vec<_> = graph.assets_containing_module(2).iter().map(|a| a.name()).collect();
    assert_eq!(names, vec!["main.js"]);
    assert_eq!(graph.assets_containing_chunk(2).len(), 1);
}

#[test]
fn test_duplication_cost() {
    let mut shared = module(3, Some("shared"), &[1, 2, 3], &[]);
    shared.raw_payload.size = 300;
    let rows = BuildRows {
        modules: vec![
            module(1, Some("a"), &[1], &[]),
            module(2, Some("b"), &[1, 2], &[]),
            shared,
        ],
        chunks: vec![chunk(1, 1, true), chunk(2, 2, false), chunk(3, 3, false)],
        ..Default::default()
    };

    let graph = build(&rows);
    let duplicated = graph.duplicated_modules();
    assert_eq!(duplicated.len(), 2);
    assert_eq!(duplicated[0].module_id, 3);
    assert_eq!(duplicated[0].extra_size, 600);
    assert_eq!(duplicated[1].module_id, 2);
    assert_eq!(duplicated[1].extra_size, 100);
    assert_eq!(graph.duplication_cost(), 700);
}

#[test]
fn test_module_cycles() {
    let rows = BuildRows {
        modules: vec![
            module(1, Some("a"), &[], &[("cjs require", Some("c"))]),
            module(2, Some("b"), &[], &[("cjs require", Some("a"))]),
            module(3, Some("c"), &[], &[("cjs require", Some("b"))]),
            module(4, Some("d"), &[], &[("cjs require", Some("a")), ("cjs self exports reference", Some("d"))]),
            module(5, Some("e"), &[], &[("cjs require", Some("a"))]),
        ],
        ..Default::default()
    };

    let graph = build(&rows);
    assert_eq!(graph.module_cycles(), vec![vec![1, 2, 3], vec![4]]);
}

#[test]
fn test_duplicate_database_ids_keep_first_row() {
    let rows = BuildRows {
        modules: vec![module(1, Some("a"), &[], &[]), module(1, Some("b"), &[], &[])],
        ..Default::default()
    };

    let graph = build(&rows);
    assert_eq!(graph.modules().count(), 1);
    assert_eq!(graph.module(1).unwrap().key.as_str(), "a");
    assert!(graph.module_by_identifier("b").is_none());
}

/// Log sink shared between a test and its scoped subscriber.
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[test]
fn test_key_collision_warns_and_last_row_wins() {
    let rows = BuildRows {
        modules: vec![
            module(1, Some("/app/a.js"), &[], &[]),
            module(2, Some("/app/a.js|f00d"), &[], &[]),
        ],
        chunks: vec![chunk(10, 1, true), chunk(11, 1, false)],
        ..Default::default()
    };

    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_max_level(tracing::Level::WARN)
        .with_ansi(false)
        .finish();
    let graph = tracing::subscriber::with_default(subscriber, || build(&rows));

    let output = logs.contents();
    assert!(output.contains("WARN"), "{output}");
    assert!(output.contains("module key reused"), "{output}");
    assert!(output.contains("chunk key reused"), "{output}");
    assert_eq!(graph.module_by_identifier("/app/a.js").unwrap().id, 2);
    assert_eq!(graph.chunk_by_native_id(&NativeChunkId::Number(1)).unwrap().id, 11);
}

#[test]
fn test_empty_input() {
    let graph = build(&BuildRows::default());
    assert!(graph.is_empty());
    assert_eq!(graph.summary(), GraphSummary::default());
}

const REASON_TYPES: &[&str] = &["cjs require", "harmony import specifier", "import()", "entry"];

#[derive(Debug, Clone)]
struct ModuleShape {
    entry: bool,
    size: u64,
    chunks: Vec<u64>,
    reasons: Vec<(usize, usize)>,
    concatenated: Vec<usize>,
}

#[derive(Debug, Clone)]
struct ChunkShape {
    entry: bool,
    size: u64,
    parents: Vec<u64>,
    children: Vec<u64>,
    siblings: Vec<u64>,
}

fn module_shape(module_count: usize) -> impl Strategy<Value = ModuleShape> {
    (
        prop::bool::weighted(0.2),
        1u64..500,
        prop::collection::vec(0u64..8, 0..3),
        prop::collection::vec((0..REASON_TYPES.len(), 0..module_count + 2), 0..4),
        prop::collection::vec(0..module_count, 0..3),
    )
        .prop_map(|(entry, size, chunks, reasons, concatenated)| ModuleShape {
            entry,
            size,
            chunks,
            reasons,
            concatenated,
        })
}

fn chunk_shape() -> impl Strategy<Value = ChunkShape> {
    (
        prop::bool::weighted(0.3),
        1u64..5000,
        prop::collection::vec(0u64..8, 0..2),
        prop::collection::vec(0u64..8, 0..2),
        prop::collection::vec(0u64..8, 0..2),
    )
        .prop_map(|(entry, size, parents, children, siblings)| ChunkShape {
            entry,
            size,
            parents,
            children,
            siblings,
        })
}

fn identifier(index: usize) -> String {
    format!("m{index}")
}

fn to_rows(modules: Vec<ModuleShape>, chunks: Vec<ChunkShape>, groups: Vec<Vec<u64>>) -> BuildRows {
    let module_rows = modules
        .iter()
        .enumerate()
        .map(|(index, shape)| {
            let mut reasons: Vec<RawReason> = shape
                .reasons
                .iter()
                .map(|&(kind, parent)| {
                    let parent = if parent % 2 == 0 {
                        format!("{}|h{parent}", identifier(parent))
                    } else {
                        identifier(parent)
                    };
                    RawReason::new(REASON_TYPES[kind], Some(&parent))
                })
                .collect();
            if shape.entry {
                reasons.push(RawReason::new("entry", None));
            }

            let inner: Vec<RawConcatenatedModule> = if shape.concatenated.is_empty() {
                Vec::new()
            } else {
                std::iter::once(index)
                    .chain(shape.concatenated.iter().copied())
                    .map(|i| RawConcatenatedModule {
                        identifier: Some(identifier(i)),
                        size: modules[i].size,
                        ..Default::default()
                    })
                    .collect()
            };

            Row::new(
                index as u64 + 1,
                1,
                RawModule {
                    identifier: Some(identifier(index)),
                    size: shape.size,
                    chunks: ids(&shape.chunks),
                    reasons,
                    modules: inner,
                    ..Default::default()
                },
            )
        })
        .collect();

    let chunk_rows = chunks
        .into_iter()
        .enumerate()
        .map(|(index, shape)| {
            Row::new(
                100 + index as u64,
                1,
                RawChunk {
                    id: Some(NativeChunkId::Number(index as u64)),
                    size: shape.size,
                    parents: ids(&shape.parents),
                    children: ids(&shape.children),
                    siblings: ids(&shape.siblings),
                    entry: shape.entry,
                    ..Default::default()
                },
            )
        })
        .collect();

    let group_rows = groups
        .iter()
        .enumerate()
        .map(|(index, chunks)| {
            Row::new(
                index as u64 + 1,
                1,
                RawNamedChunkGroup {
                    name: format!("g{index}"),
                    chunks: ids(chunks),
                },
            )
        })
        .collect();

    let asset_rows = groups
        .iter()
        .enumerate()
        .map(|(index, chunks)| {
            Row::new(
                index as u64 + 1,
                1,
                RawAsset {
                    name: format!("g{index}.js"),
                    size: 10,
                    chunks: ids(chunks),
                },
            )
        })
        .collect();

    BuildRows {
        modules: module_rows,
        chunks: chunk_rows,
        named_chunk_groups: group_rows,
        assets: asset_rows,
    }
}

fn rows_strategy() -> impl Strategy<Value = BuildRows> {
    (1usize..10, 1usize..6)
        .prop_flat_map(|(module_count, chunk_count)| {
            (
                prop::collection::vec(module_shape(module_count), module_count),
                prop::collection::vec(chunk_shape(), chunk_count),
                prop::collection::vec(prop::collection::vec(0u64..8, 0..4), 0..3),
            )
        })
        .prop_map(|(modules, chunks, groups)| to_rows(modules, chunks, groups))
}

/// Multi-source BFS distances over module child edges.
fn module_distances(graph: &BuildGraph) -> HashMap<u64, usize> {
    let mut distances = HashMap::new();
    let mut queue = VecDeque::new();
    for module in graph.entry_modules() {
        distances.insert(module.id, 0);
        queue.push_back(module.id);
    }
    while let Some(id) = queue.pop_front() {
        let next_distance = distances[&id] + 1;
        for &child in &graph.module(id).unwrap().child_module_ids {
            if let std::collections::hash_map::Entry::Vacant(entry) = distances.entry(child) {
                entry.insert(next_distance);
                queue.push_back(child);
            }
        }
    }
    distances
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Building twice from the same rows gives the same graph.
    #[test]
    fn prop_build_is_idempotent(rows in rows_strategy()) {
        let first = build(&rows);
        let second = build(&rows);
        prop_assert_eq!(first, second);
    }

    /// Sibling links are mutual whatever the input lists.
    #[test]
    fn prop_siblings_are_symmetric(rows in rows_strategy()) {
        let graph = build(&rows);
        for chunk in graph.chunks() {
            for &sibling in &chunk.sibling_chunk_ids {
                prop_assert!(graph.chunk(sibling).unwrap().sibling_chunk_ids.contains(&chunk.id));
            }
        }
    }

    /// Paths from the entry are valid shortest walks along child edges.
    #[test]
    fn prop_module_paths_are_shortest_walks(rows in rows_strategy()) {
        let graph = build(&rows);
        let distances = module_distances(&graph);

        for module in graph.modules() {
            let path = &module.path_from_entry;
            if module.is_entry {
                prop_assert_eq!(path, &vec![module.id]);
                continue;
            }
            match distances.get(&module.id) {
                None => prop_assert!(path.is_empty()),
                Some(&distance) => {
                    prop_assert_eq!(path.len(), distance + 1);
                    prop_assert!(graph.module(path[0]).unwrap().is_entry);
                    prop_assert_eq!(*path.last().unwrap(), module.id);
                    for step in path.windows(2) {
                        prop_assert!(graph.relationship(step[0], step[1]).is_some());
                    }
                }
            }
        }
    }

    /// A group's total is the size of exactly its resolved chunks.
    #[test]
    fn prop_named_chunk_group_totals(rows in rows_strategy()) {
        let graph = build(&rows);
        for group in graph.named_chunk_groups() {
            let expected: u64 = group
                .chunk_ids
                .iter()
                .map(|&id| graph.chunk(id).unwrap().raw_size())
                .sum();
            prop_assert_eq!(group.total_size, expected);
        }
    }

    /// Sub-modules are flagged and attributed to every chunk of their super-module.
    #[test]
    fn prop_concatenation_attribution(rows in rows_strategy()) {
        let graph = build(&rows);
        for module in graph.modules().filter(|m| m.is_super_module) {
            prop_assert!(!module.inner_concatenated_module_ids.contains(&module.id));
            for &sub in &module.inner_concatenated_module_ids {
                prop_assert!(graph.module(sub).unwrap().is_sub_module);
                for &chunk in &module.parent_chunk_ids {
                    prop_assert!(graph.chunk(chunk).unwrap().child_submodule_ids.contains(&sub));
                }
            }
        }
    }
}
