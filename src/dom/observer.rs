//! 变更观察器
//!
//! 语义与浏览器 `MutationObserver` 保持一致：
//!
//! - `observe` 对同一目标重复调用只会替换选项，不会重复登记
//! - `disconnect` 移除全部登记并丢弃尚未投递的记录
//! - 记录先进入观察器自己的队列，由 [`Document::flush_mutations`] 批量投递
//!
//! [`Document::flush_mutations`]: super::document::Document::flush_mutations

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use markup5ever_rcdom::Handle;

use super::document::Document;

/// 变更类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    /// 子节点增删
    ChildList,
    /// 文本内容变化
    CharacterData,
}

/// 一条变更记录
#[derive(Clone)]
pub struct MutationRecord {
    pub kind: MutationKind,
    /// `ChildList` 时为父节点，`CharacterData` 时为文本节点本身
    pub target: Handle,
    pub added_nodes: Vec<Handle>,
    pub removed_nodes: Vec<Handle>,
    pub old_value: Option<String>,
}

impl MutationRecord {
    pub fn child_list(target: Handle, added_nodes: Vec<Handle>, removed_nodes: Vec<Handle>) -> Self {
        Self {
            kind: MutationKind::ChildList,
            target,
            added_nodes,
            removed_nodes,
            old_value: None,
        }
    }

    pub fn character_data(target: Handle, old_value: String) -> Self {
        Self {
            kind: MutationKind::CharacterData,
            target,
            added_nodes: Vec::new(),
            removed_nodes: Vec::new(),
            old_value: Some(old_value),
        }
    }
}

impl fmt::Debug for MutationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MutationRecord")
            .field("kind", &self.kind)
            .field("added_nodes", &self.added_nodes.len())
            .field("removed_nodes", &self.removed_nodes.len())
            .field("old_value", &self.old_value)
            .finish()
    }
}

/// 观察选项
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObserverOptions {
    pub child_list: bool,
    pub character_data: bool,
    pub subtree: bool,
}

impl ObserverOptions {
    /// 子树结构变化
    pub const NODES: ObserverOptions = ObserverOptions {
        child_list: true,
        character_data: false,
        subtree: true,
    };

    /// 子树文本变化
    pub const TEXT: ObserverOptions = ObserverOptions {
        child_list: false,
        character_data: true,
        subtree: true,
    };

    pub fn accepts(&self, kind: MutationKind) -> bool {
        match kind {
            MutationKind::ChildList => self.child_list,
            MutationKind::CharacterData => self.character_data,
        }
    }
}

pub type MutationCallback = Box<dyn FnMut(&[MutationRecord])>;

pub(crate) struct ObserverInner {
    id: usize,
    callback: RefCell<MutationCallback>,
    records: RefCell<Vec<MutationRecord>>,
    queued: Cell<bool>,
}

impl ObserverInner {
    pub(crate) fn id(&self) -> usize {
        self.id
    }

    /// 入队一条记录，返回观察器此前是否处于空闲状态
    pub(crate) fn enqueue(&self, record: MutationRecord) -> bool {
        self.records.borrow_mut().push(record);
        !self.queued.replace(true)
    }

    pub(crate) fn take_records(&self) -> Vec<MutationRecord> {
        self.queued.set(false);
        std::mem::take(&mut *self.records.borrow_mut())
    }

    /// 调用回调；回调仍在执行时的重入调用被忽略
    pub(crate) fn invoke(&self, records: &[MutationRecord]) -> bool {
        match self.callback.try_borrow_mut() {
            Ok(mut callback) => {
                let callback: &mut MutationCallback = &mut callback;
                callback(records);
                true
            }
            Err(_) => {
                tracing::warn!(observer = self.id, "re-entrant observer callback skipped");
                false
            }
        }
    }
}

/// 观察器句柄，可以廉价克隆
#[derive(Clone)]
pub struct MutationObserver {
    inner: Rc<ObserverInner>,
    document: Weak<Document>,
}

impl MutationObserver {
    /// 在文档上创建观察器，创建后尚未观察任何节点
    pub fn new<F>(document: &Rc<Document>, callback: F) -> Self
    where
        F: FnMut(&[MutationRecord]) + 'static,
    {
        Self {
            inner: Rc::new(ObserverInner {
                id: document.next_observer_id(),
                callback: RefCell::new(Box::new(callback)),
                records: RefCell::new(Vec::new()),
                queued: Cell::new(false),
            }),
            document: Rc::downgrade(document),
        }
    }

    /// 开始观察 `target`，对同一目标重复调用只更新选项
    pub fn observe(&self, target: &Handle, options: ObserverOptions) {
        if let Some(document) = self.document.upgrade() {
            document.register(&self.inner, target, options);
        }
    }

    /// 停止全部观察并丢弃未投递的记录
    pub fn disconnect(&self) {
        if let Some(document) = self.document.upgrade() {
            document.unregister(&self.inner);
        }
        self.inner.take_records();
    }

    pub fn is_observing(&self) -> bool {
        self.document
            .upgrade()
            .is_some_and(|document| document.is_registered(&self.inner))
    }

    /// 取走尚未投递的记录
    pub fn take_records(&self) -> Vec<MutationRecord> {
        self.inner.take_records()
    }

    /// 重新排入 [`take_records`](Self::take_records) 取走的记录
    pub(crate) fn requeue(&self, records: Vec<MutationRecord>) {
        if records.is_empty() {
            return;
        }
        if let Some(document) = self.document.upgrade() {
            document.requeue(&self.inner, records);
        }
    }
}

impl fmt::Debug for MutationObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MutationObserver")
            .field("id", &self.inner.id)
            .field("pending", &self.inner.records.borrow().len())
            .finish()
    }
}
