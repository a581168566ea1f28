use crate::error::TreeError;
use crate::task::{ChildSide, ROOT_ID, Task, TaskNode};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
struct TreeSlot {
    task: Task,
    parent: Option<String>,
    children: Vec<String>,
}

/// Task hierarchy stored as an arena keyed by task id.
///
/// Each task is owned by exactly one parent; the relation is kept as a parent
/// pointer plus an ordered child list, so traversals never follow shared
/// references and never recurse on the call stack.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskTree {
    root_id: String,
    slots: HashMap<String, TreeSlot>,
}

impl TaskTree {
    /// New single-node tree with the reserved root id.
    pub fn with_root(text: impl Into<String>) -> Self {
        Self::from_root_task(Task::new(ROOT_ID, text))
    }

    pub fn from_root_task(root: Task) -> Self {
        let root_id = root.id.clone();
        let mut slots = HashMap::new();
        slots.insert(
            root_id.clone(),
            TreeSlot {
                task: root,
                parent: None,
                children: Vec::new(),
            },
        );
        Self { root_id, slots }
    }

    /// Build the arena from a nested document.
    ///
    /// A task id that shows up a second time is skipped together with its
    /// subtree; the first occurrence in pre-order wins.
    pub fn from_node(root: &TaskNode) -> Self {
        let mut tree = Self::from_root_task(root.to_task());
        let mut stack: Vec<(&TaskNode, &str)> = root
            .children
            .iter()
            .rev()
            .map(|child| (child, root.id.as_str()))
            .collect();

        while let Some((node, parent_id)) = stack.pop() {
            if tree.slots.contains_key(&node.id) {
                log::warn!(
                    "task {} appears more than once in the tree; keeping the first occurrence",
                    node.id
                );
                continue;
            }
            tree.insert_slot(parent_id, node.to_task());
            for child in node.children.iter().rev() {
                stack.push((child, node.id.as_str()));
            }
        }
        tree
    }

    /// Nested document form of the tree.
    pub fn to_node(&self) -> TaskNode {
        let order = self.ids();
        let mut built: HashMap<&str, TaskNode> = HashMap::with_capacity(order.len());
        for id in order.iter().rev() {
            let slot = &self.slots[id];
            let children = slot
                .children
                .iter()
                .filter_map(|child| built.remove(child.as_str()))
                .collect();
            built.insert(id.as_str(), TaskNode::from_task(slot.task.clone(), children));
        }
        built
            .remove(self.root_id.as_str())
            .unwrap_or_else(|| TaskNode::from_task(self.slots[&self.root_id].task.clone(), vec![]))
    }

    pub fn root_id(&self) -> &str {
        &self.root_id
    }

    pub fn root(&self) -> &Task {
        &self.slots[&self.root_id].task
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.slots.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.slots.get(id).map(|slot| &slot.task)
    }

    pub fn parent_of(&self, id: &str) -> Option<&str> {
        self.slots.get(id).and_then(|slot| slot.parent.as_deref())
    }

    pub fn children_of(&self, id: &str) -> &[String] {
        self.slots
            .get(id)
            .map(|slot| slot.children.as_slice())
            .unwrap_or(&[])
    }

    /// Task ids in pre-order (parent before children, children in order).
    pub fn ids(&self) -> Vec<String> {
        let mut order = Vec::with_capacity(self.slots.len());
        let mut stack = vec![self.root_id.as_str()];
        while let Some(id) = stack.pop() {
            order.push(id.to_string());
            if let Some(slot) = self.slots.get(id) {
                for child in slot.children.iter().rev() {
                    stack.push(child.as_str());
                }
            }
        }
        order
    }

    /// Tasks in pre-order.
    pub fn flatten(&self) -> Vec<&Task> {
        self.ids()
            .iter()
            .filter_map(|id| self.slots.get(id).map(|slot| &slot.task))
            .collect()
    }

    /// Child id to parent id for every non-root task.
    pub fn parent_map(&self) -> HashMap<String, String> {
        self.slots
            .iter()
            .filter_map(|(id, slot)| slot.parent.clone().map(|parent| (id.clone(), parent)))
            .collect()
    }

    /// Parent/child pairs in pre-order of the parent.
    pub fn hierarchy_pairs(&self) -> Vec<(&Task, &Task)> {
        let mut pairs = Vec::new();
        for id in self.ids() {
            let slot = &self.slots[&id];
            for child in &slot.children {
                if let Some(child_slot) = self.slots.get(child) {
                    pairs.push((&slot.task, &child_slot.task));
                }
            }
        }
        pairs
    }

    /// True when `candidate` lies in the subtree rooted at `ancestor`
    /// (a task counts as its own descendant).
    pub fn is_descendant(&self, candidate: &str, ancestor: &str) -> bool {
        let mut current = Some(candidate);
        let mut guard = 0usize;
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            guard += 1;
            if guard > self.slots.len() {
                return false;
            }
            current = self.parent_of(id);
        }
        false
    }

    /// Ids of the subtree rooted at `id`, in pre-order.
    pub fn subtree_ids(&self, id: &str) -> Vec<String> {
        let mut out = Vec::new();
        if !self.contains(id) {
            return out;
        }
        let mut stack = vec![id.to_string()];
        while let Some(current) = stack.pop() {
            for child in self.children_of(&current).iter().rev() {
                stack.push(child.clone());
            }
            out.push(current);
        }
        out
    }

    pub fn add_child(&mut self, parent_id: &str, task: Task) -> Result<(), TreeError> {
        if !self.contains(parent_id) {
            return Err(TreeError::UnknownTask(parent_id.to_string()));
        }
        if self.contains(&task.id) {
            return Err(TreeError::DuplicateId(task.id));
        }
        self.insert_slot(parent_id, task);
        Ok(())
    }

    /// Edit a task's fields in place. The id is restored if the closure
    /// changes it.
    pub fn update<F>(&mut self, id: &str, mutator: F) -> Result<(), TreeError>
    where
        F: FnOnce(&mut Task),
    {
        let slot = self
            .slots
            .get_mut(id)
            .ok_or_else(|| TreeError::UnknownTask(id.to_string()))?;
        mutator(&mut slot.task);
        slot.task.id = id.to_string();
        Ok(())
    }

    /// Remove a task and its whole subtree. Returns the removed ids.
    pub fn remove(&mut self, id: &str) -> Result<Vec<String>, TreeError> {
        if id == self.root_id {
            return Err(TreeError::RootImmutable("deleted"));
        }
        if !self.contains(id) {
            return Err(TreeError::UnknownTask(id.to_string()));
        }
        self.unlink_from_parent(id);
        let removed = self.subtree_ids(id);
        for removed_id in &removed {
            self.slots.remove(removed_id);
        }
        Ok(removed)
    }

    /// Re-parent a task (with its subtree) as the last child of `new_parent`.
    pub fn move_node(&mut self, id: &str, new_parent: &str) -> Result<(), TreeError> {
        if id == self.root_id {
            return Err(TreeError::RootImmutable("moved"));
        }
        if !self.contains(id) {
            return Err(TreeError::UnknownTask(id.to_string()));
        }
        if !self.contains(new_parent) {
            return Err(TreeError::UnknownTask(new_parent.to_string()));
        }
        if self.is_descendant(new_parent, id) {
            return Err(TreeError::MoveIntoSubtree {
                task: id.to_string(),
                target: new_parent.to_string(),
            });
        }
        self.unlink_from_parent(id);
        self.attach(new_parent, id);
        Ok(())
    }

    /// Cut a task loose from its parent and hang it directly under the root.
    pub fn detach(&mut self, id: &str) -> Result<(), TreeError> {
        let root_id = self.root_id.clone();
        self.move_node(id, &root_id)?;
        if let Some(slot) = self.slots.get_mut(id) {
            slot.task.side.get_or_insert(ChildSide::After);
        }
        Ok(())
    }

    /// Copy of the tree with every task passed through `f`.
    pub(crate) fn map_tasks<F>(&self, mut f: F) -> Self
    where
        F: FnMut(&Task) -> Task,
    {
        let slots = self
            .slots
            .iter()
            .map(|(id, slot)| {
                let mut task = f(&slot.task);
                task.id = id.clone();
                (
                    id.clone(),
                    TreeSlot {
                        task,
                        parent: slot.parent.clone(),
                        children: slot.children.clone(),
                    },
                )
            })
            .collect();
        Self {
            root_id: self.root_id.clone(),
            slots,
        }
    }

    fn insert_slot(&mut self, parent_id: &str, task: Task) {
        let id = task.id.clone();
        self.slots.insert(
            id.clone(),
            TreeSlot {
                task,
                parent: Some(parent_id.to_string()),
                children: Vec::new(),
            },
        );
        if let Some(parent) = self.slots.get_mut(parent_id) {
            parent.children.push(id);
        }
    }

    fn attach(&mut self, parent_id: &str, id: &str) {
        if let Some(slot) = self.slots.get_mut(id) {
            slot.parent = Some(parent_id.to_string());
        }
        if let Some(parent) = self.slots.get_mut(parent_id) {
            parent.children.push(id.to_string());
        }
    }

    fn unlink_from_parent(&mut self, id: &str) {
        let parent_id = self.slots.get_mut(id).and_then(|slot| slot.parent.take());
        if let Some(parent_id) = parent_id {
            if let Some(parent) = self.slots.get_mut(&parent_id) {
                parent.children.retain(|child| child != id);
            }
        }
    }
}

impl From<&TaskNode> for TaskTree {
    fn from(node: &TaskNode) -> Self {
        TaskTree::from_node(node)
    }
}
