//! Stack-based construction of a [`SyntaxTree`] from a foreign tree.
//!
//! An adapter describes each input node as a [`Plan`]: its range and its
//! child inputs grouped by field. [`lower_tree`] lowers the children with an
//! explicit work stack and hands the resulting ids back to the adapter, so
//! nesting depth is bounded by memory rather than by the thread's stack.

use super::{NodeId, NodeKind, NodeList, SyntaxTree, TextRange, TreeBuilder};

/// Child inputs filling one field of a node.
pub(crate) enum Field<I> {
    /// Single child, absent when `None`
    One(Option<I>),
    /// Child list
    Many(Vec<I>),
}

/// How one input node is lowered.
pub(crate) struct Plan<I, S> {
    /// Range of the node
    pub(crate) range: TextRange,
    /// Adapter-specific tag handed back to [`Lowering::assemble`]
    pub(crate) shape: S,
    /// Children, in source order
    pub(crate) fields: Vec<Field<I>>,
}

/// Outcome of [`Lowering::plan`].
pub(crate) enum Planned<I, S> {
    /// Not a node
    Skip,
    /// Transparent wrapper: lower this input in its place
    Replace(I),
    /// A node of its own
    Node(Plan<I, S>),
}

enum Slot {
    One(Option<NodeId>),
    Many(NodeList),
}

/// Lowered children, consumed in the order of the plan's fields.
pub(crate) struct Fields {
    slots: std::vec::IntoIter<Slot>,
    all: NodeList,
}

impl Fields {
    fn new(layout: Vec<Layout>, produced: Vec<Option<NodeId>>) -> Self {
        let mut produced = produced.into_iter();
        let mut all = NodeList::new();
        let mut slots = Vec::with_capacity(layout.len());
        for entry in layout {
            let slot = match entry {
                Layout::One(false) => Slot::One(None),
                Layout::One(true) => {
                    let id = produced.next().flatten();
                    all.extend(id);
                    Slot::One(id)
                }
                Layout::Many(count) => {
                    let ids: NodeList = produced.by_ref().take(count).flatten().collect();
                    all.extend_from_slice(&ids);
                    Slot::Many(ids)
                }
            };
            slots.push(slot);
        }
        Self {
            slots: slots.into_iter(),
            all,
        }
    }

    /// Next field as a single child.
    pub(crate) fn one(&mut self) -> Option<NodeId> {
        match self.slots.next() {
            Some(Slot::One(id)) => id,
            _ => None,
        }
    }

    /// Next field as a child list.
    pub(crate) fn many(&mut self) -> NodeList {
        match self.slots.next() {
            Some(Slot::Many(ids)) => ids,
            _ => NodeList::new(),
        }
    }

    /// Every lowered child in field order, consumed or not.
    pub(crate) fn into_all(self) -> NodeList {
        self.all
    }
}

/// A foreign tree that can be lowered into a [`SyntaxTree`].
pub(crate) trait Lowering {
    /// Handle to one input node
    type Input: Copy;
    /// Tag carried from [`plan`](Self::plan) to [`assemble`](Self::assemble)
    type Shape;

    /// Describe `input`; `fallback` is the parent's range.
    fn plan(
        &mut self,
        input: Self::Input,
        fallback: TextRange,
    ) -> Planned<Self::Input, Self::Shape>;

    /// Build the kind of `input` once its children are lowered. `builder`
    /// may be used to add synthesized nodes under `id`.
    fn assemble(
        &mut self,
        builder: &mut TreeBuilder,
        input: Self::Input,
        shape: Self::Shape,
        id: NodeId,
        fields: Fields,
    ) -> NodeKind;
}

enum Layout {
    One(bool),
    Many(usize),
}

impl Layout {
    fn count(&self) -> usize {
        match self {
            Self::One(present) => usize::from(*present),
            Self::Many(count) => *count,
        }
    }
}

enum Step<I, S> {
    Enter {
        input: I,
        parent: Option<NodeId>,
        fallback: TextRange,
    },
    Exit {
        input: I,
        id: NodeId,
        shape: S,
        layout: Vec<Layout>,
    },
}

/// Lower `root` and everything below it; `None` if `root` is not a node.
///
/// Every `Enter` step leaves exactly one entry on the result stack, so an
/// `Exit` finds its children's ids on top of it, in order.
pub(crate) fn lower_tree<L: Lowering>(
    lowering: &mut L,
    root: L::Input,
    source: &str,
) -> Option<SyntaxTree> {
    let mut builder = TreeBuilder::new();
    let mut results: Vec<Option<NodeId>> = Vec::new();
    let mut stack = vec![Step::Enter {
        input: root,
        parent: None,
        fallback: TextRange::new(0, source.len()),
    }];

    while let Some(step) = stack.pop() {
        match step {
            Step::Enter {
                input,
                parent,
                fallback,
            } => match lowering.plan(input, fallback) {
                Planned::Skip => results.push(None),
                Planned::Replace(inner) => stack.push(Step::Enter {
                    input: inner,
                    parent,
                    fallback,
                }),
                Planned::Node(plan) => {
                    let range = plan.range;
                    let id = builder.reserve(range, parent);
                    let mut layout = Vec::with_capacity(plan.fields.len());
                    let mut children = Vec::new();
                    for field in plan.fields {
                        match field {
                            Field::One(child) => {
                                layout.push(Layout::One(child.is_some()));
                                children.extend(child);
                            }
                            Field::Many(list) => {
                                layout.push(Layout::Many(list.len()));
                                children.extend(list);
                            }
                        }
                    }
                    stack.push(Step::Exit {
                        input,
                        id,
                        shape: plan.shape,
                        layout,
                    });
                    stack.extend(children.into_iter().rev().map(|child| Step::Enter {
                        input: child,
                        parent: Some(id),
                        fallback: range,
                    }));
                }
            },
            Step::Exit {
                input,
                id,
                shape,
                layout,
            } => {
                let count: usize = layout.iter().map(Layout::count).sum();
                let produced = results.split_off(results.len().saturating_sub(count));
                let fields = Fields::new(layout, produced);
                let kind = lowering.assemble(&mut builder, input, shape, id, fields);
                builder.finish_node(id, kind);
                results.push(Some(id));
            }
        }
    }

    let root_id = results.pop().flatten()?;
    Some(builder.finish(source.to_owned(), root_id))
}
