use markup5ever_rcdom::Handle;

use crate::dom::{MutationObserver, MutationRecord, ObserverOptions};

/// 引擎的两个观察器：文本变化与结构变化，都作用于挂载点子树
pub struct Observers {
    attach_node: Handle,
    text: MutationObserver,
    node: MutationObserver,
}

impl Observers {
    pub fn new(attach_node: Handle, text: MutationObserver, node: MutationObserver) -> Self {
        Self {
            attach_node,
            text,
            node,
        }
    }

    pub fn start_text(&self) {
        self.text.observe(&self.attach_node, ObserverOptions::TEXT);
    }

    pub fn stop_text(&self) {
        self.text.disconnect();
    }

    pub fn start_node(&self) {
        self.node.observe(&self.attach_node, ObserverOptions::NODES);
    }

    pub fn stop_node(&self) {
        self.node.disconnect();
    }

    pub fn is_text_observing(&self) -> bool {
        self.text.is_observing()
    }

    pub fn is_node_observing(&self) -> bool {
        self.node.is_observing()
    }

    /// 暂停两个观察器，直到返回的守卫被丢弃
    ///
    /// 暂停前已排队的记录来自外部修改，由守卫暂存，恢复时重新排入队列。
    pub fn suspend(&self) -> SuspendGuard<'_> {
        let held_text = self.is_text_observing().then(|| {
            let records = self.text.take_records();
            self.stop_text();
            records
        });
        let held_node = self.is_node_observing().then(|| {
            let records = self.node.take_records();
            self.stop_node();
            records
        });

        SuspendGuard {
            observers: self,
            held_text,
            held_node,
        }
    }
}

/// 观察暂停守卫
///
/// 析构时只恢复创建前处于观察状态的观察器。嵌套时内层守卫看到的是已暂停状态，
/// 析构时什么也不恢复，真正的恢复发生在最外层。
#[must_use = "observers resume as soon as the guard is dropped"]
pub struct SuspendGuard<'a> {
    observers: &'a Observers,
    held_text: Option<Vec<MutationRecord>>,
    held_node: Option<Vec<MutationRecord>>,
}

impl Drop for SuspendGuard<'_> {
    fn drop(&mut self) {
        if let Some(records) = self.held_text.take() {
            self.observers.start_text();
            self.observers.text.requeue(records);
        }
        if let Some(records) = self.held_node.take() {
            self.observers.start_node();
            self.observers.node.requeue(records);
        }
    }
}
