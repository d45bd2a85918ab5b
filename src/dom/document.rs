//! 可观察的宿主文档
//!
//! 包装 `RcDom`，所有会改变树的操作都经过这里，以便为登记的观察器生成变更记录。
//! 直接修改 `Handle` 内部字段不会产生记录，相当于绕过了宿主环境。

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use html5ever::tendril::StrTendril;
use html5ever::tree_builder::create_element;
use html5ever::{namespace_url, ns, LocalName, QualName};
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom};

use super::observer::{MutationKind, MutationRecord, ObserverInner, ObserverOptions};
use crate::parsers::html::dom::{
    get_child_index, get_child_node_by_name, get_node_attr, get_parent_node,
};
use crate::parsers::html::html_to_dom;

struct Registration {
    observer: Weak<ObserverInner>,
    target: Handle,
    options: ObserverOptions,
}

/// 宿主文档
pub struct Document {
    dom: RcDom,
    registrations: RefCell<Vec<Registration>>,
    pending: RefCell<Vec<Rc<ObserverInner>>>,
    delivering: Cell<bool>,
    observer_ids: Cell<usize>,
}

impl Document {
    pub fn new(dom: RcDom) -> Rc<Self> {
        Rc::new(Self {
            dom,
            registrations: RefCell::new(Vec::new()),
            pending: RefCell::new(Vec::new()),
            delivering: Cell::new(false),
            observer_ids: Cell::new(0),
        })
    }

    /// 解析 UTF-8 HTML 字符串
    pub fn parse_html(html: &str) -> Rc<Self> {
        Self::new(html_to_dom(html.as_bytes(), "utf-8".to_string()))
    }

    /// 文档根节点
    pub fn root(&self) -> Handle {
        self.dom.document.clone()
    }

    pub fn document_element(&self) -> Option<Handle> {
        get_child_node_by_name(&self.dom.document, "html")
    }

    /// `<body>`，不存在时退回根节点
    pub fn body(&self) -> Handle {
        self.document_element()
            .and_then(|html| get_child_node_by_name(&html, "body"))
            .unwrap_or_else(|| self.root())
    }

    /// `<html lang>` 声明的语言
    pub fn html_lang(&self) -> Option<String> {
        self.document_element()
            .and_then(|html| get_node_attr(&html, "lang"))
            .filter(|lang| !lang.is_empty())
    }

    /// 创建一个没有属性的元素，尚未插入文档
    pub fn create_element(&self, name: &str) -> Handle {
        create_element(
            &self.dom,
            QualName::new(None, ns!(), LocalName::from(name)),
            Vec::new(),
        )
    }

    pub fn create_text(&self, data: &str) -> Handle {
        Node::new(NodeData::Text {
            contents: RefCell::new(StrTendril::from_slice(data)),
        })
    }

    pub fn create_comment(&self, data: &str) -> Handle {
        Node::new(NodeData::Comment {
            contents: StrTendril::from_slice(data),
        })
    }

    /// 改写文本节点内容，非文本节点不做任何事并返回 `false`
    pub fn set_text(&self, node: &Handle, data: &str) -> bool {
        let NodeData::Text { ref contents } = node.data else {
            return false;
        };

        let old_value = contents.replace(StrTendril::from_slice(data)).to_string();
        self.queue_record(MutationRecord::character_data(node.clone(), old_value));
        true
    }

    /// 将 `child` 追加为 `parent` 的最后一个子节点
    pub fn append_child(&self, parent: &Handle, child: &Handle) {
        self.remove(child);

        parent.children.borrow_mut().push(child.clone());
        child.parent.set(Some(Rc::downgrade(parent)));

        self.queue_record(MutationRecord::child_list(
            parent.clone(),
            vec![child.clone()],
            Vec::new(),
        ));
    }

    /// 将 `new_node` 插入到 `reference` 之后；`reference` 没有父节点时返回 `false`
    pub fn insert_after(&self, reference: &Handle, new_node: &Handle) -> bool {
        let Some(parent) = get_parent_node(reference) else {
            return false;
        };
        self.remove(new_node);

        let Some(index) = get_child_index(&parent, reference) else {
            return false;
        };
        parent.children.borrow_mut().insert(index + 1, new_node.clone());
        new_node.parent.set(Some(Rc::downgrade(&parent)));

        self.queue_record(MutationRecord::child_list(
            parent,
            vec![new_node.clone()],
            Vec::new(),
        ));
        true
    }

    /// 用 `new_node` 原位替换 `old`；`old` 没有父节点时返回 `false`
    pub fn replace_with(&self, old: &Handle, new_node: &Handle) -> bool {
        if Rc::ptr_eq(old, new_node) {
            return true;
        }
        let Some(parent) = get_parent_node(old) else {
            return false;
        };
        self.remove(new_node);

        let Some(index) = get_child_index(&parent, old) else {
            return false;
        };
        parent.children.borrow_mut()[index] = new_node.clone();
        new_node.parent.set(Some(Rc::downgrade(&parent)));
        old.parent.set(None);

        self.queue_record(MutationRecord::child_list(
            parent,
            vec![new_node.clone()],
            vec![old.clone()],
        ));
        true
    }

    /// 将节点从父节点中移除；没有父节点时返回 `false`
    pub fn remove(&self, node: &Handle) -> bool {
        let Some(parent) = get_parent_node(node) else {
            return false;
        };
        let Some(index) = get_child_index(&parent, node) else {
            node.parent.set(None);
            return false;
        };

        parent.children.borrow_mut().remove(index);
        node.parent.set(None);

        self.queue_record(MutationRecord::child_list(
            parent,
            Vec::new(),
            vec![node.clone()],
        ));
        true
    }

    /// 投递全部待处理的变更记录，返回回调调用次数
    ///
    /// 相当于宿主环境的微任务检查点：回调中产生的新记录会在同一次调用中继续投递，
    /// 直到队列清空。回调内部再次调用本方法不会产生任何效果。
    pub fn flush_mutations(&self) -> usize {
        if self.delivering.replace(true) {
            return 0;
        }
        let _scope = DeliveryScope(&self.delivering);

        let mut invocations = 0;
        loop {
            let observers = std::mem::take(&mut *self.pending.borrow_mut());
            if observers.is_empty() {
                break;
            }

            for observer in observers {
                let records = observer.take_records();
                if records.is_empty() {
                    continue;
                }
                tracing::trace!(
                    observer = observer.id(),
                    records = records.len(),
                    "delivering mutation records"
                );
                if observer.invoke(&records) {
                    invocations += 1;
                }
            }
        }

        invocations
    }

    /// 是否还有未投递的记录
    pub fn has_pending_mutations(&self) -> bool {
        !self.pending.borrow().is_empty()
    }

    pub(crate) fn next_observer_id(&self) -> usize {
        let id = self.observer_ids.get();
        self.observer_ids.set(id + 1);
        id
    }

    pub(crate) fn register(
        &self,
        observer: &Rc<ObserverInner>,
        target: &Handle,
        options: ObserverOptions,
    ) {
        let mut registrations = self.registrations.borrow_mut();
        registrations.retain(|r| r.observer.strong_count() > 0);

        let existing = registrations.iter_mut().find(|r| {
            Rc::ptr_eq(&r.target, target)
                && r.observer
                    .upgrade()
                    .is_some_and(|o| Rc::ptr_eq(&o, observer))
        });

        match existing {
            Some(registration) => registration.options = options,
            None => registrations.push(Registration {
                observer: Rc::downgrade(observer),
                target: target.clone(),
                options,
            }),
        }
    }

    pub(crate) fn unregister(&self, observer: &Rc<ObserverInner>) {
        self.registrations.borrow_mut().retain(|r| {
            r.observer
                .upgrade()
                .is_some_and(|o| !Rc::ptr_eq(&o, observer))
        });
        self.pending
            .borrow_mut()
            .retain(|pending| !Rc::ptr_eq(pending, observer));
    }

    /// 把先前取走的记录放回观察器队列，在下一次投递时交付
    pub(crate) fn requeue(&self, observer: &Rc<ObserverInner>, records: Vec<MutationRecord>) {
        for record in records {
            if observer.enqueue(record) {
                self.pending.borrow_mut().push(observer.clone());
            }
        }
    }

    pub(crate) fn is_registered(&self, observer: &Rc<ObserverInner>) -> bool {
        self.registrations.borrow().iter().any(|r| {
            r.observer
                .upgrade()
                .is_some_and(|o| Rc::ptr_eq(&o, observer))
        })
    }

    /// 按祖先链把记录分发给感兴趣的观察器，每个观察器至多一份
    fn queue_record(&self, record: MutationRecord) {
        let interested = self.interested_observers(&record.target, record.kind);

        for observer in interested {
            if observer.enqueue(record.clone()) {
                self.pending.borrow_mut().push(observer);
            }
        }
    }

    fn interested_observers(&self, target: &Handle, kind: MutationKind) -> Vec<Rc<ObserverInner>> {
        let registrations = self.registrations.borrow();
        let mut interested: Vec<Rc<ObserverInner>> = Vec::new();

        let mut current = Some(target.clone());
        while let Some(node) = current {
            let is_target = Rc::ptr_eq(&node, target);

            for registration in registrations.iter() {
                if !Rc::ptr_eq(&registration.target, &node) {
                    continue;
                }
                if !is_target && !registration.options.subtree {
                    continue;
                }
                if !registration.options.accepts(kind) {
                    continue;
                }
                let Some(observer) = registration.observer.upgrade() else {
                    continue;
                };
                if !interested.iter().any(|o| Rc::ptr_eq(o, &observer)) {
                    interested.push(observer);
                }
            }

            current = get_parent_node(&node);
        }

        interested
    }
}

struct DeliveryScope<'a>(&'a Cell<bool>);

impl Drop for DeliveryScope<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}
