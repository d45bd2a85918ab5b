//   ██████╗ ██████╗ ███████╗███████╗██████╗ ██╗   ██╗███████╗
//  ██╔═══██╗██╔══██╗██╔════╝██╔════╝██╔══██╗██║   ██║██╔════╝
//  ██║   ██║██████╔╝███████╗█████╗  ██████╔╝██║   ██║█████╗
//  ██║   ██║██╔══██╗╚════██║██╔══╝  ██╔══██╗╚██╗ ██╔╝██╔══╝
//  ╚██████╔╝██████╔╝███████║███████╗██║  ██║ ╚████╔╝ ███████╗
//   ╚═════╝ ╚═════╝ ╚══════╝╚══════╝╚═╝  ╚═╝  ╚═══╝  ╚══════╝

#[allow(dead_code)]
mod common {
    include!("common/mod.rs");
}

use common::{carrier_of, child, Fixture};
use i18n_dom::i18n::EngineStats;

#[test]
fn inserted_text_is_translated() {
    let fixture = Fixture::new("<p>Hello</p>", "es");
    let paragraph = child(&fixture.document.body(), 0);

    let text = fixture.document.create_text("Bye");
    fixture.document.append_child(&paragraph, &text);
    assert_eq!(fixture.texts(), vec!["Hola", "Bye"]);

    // 回调在检查点运行，引擎自己的写入不会再产生一轮回调
    assert_eq!(fixture.document.flush_mutations(), 1);
    assert_eq!(fixture.texts(), vec!["Hola", "Adiós"]);
    assert_eq!(fixture.engine.stats().node_callbacks, 1);
    assert!(!fixture.document.has_pending_mutations());
}

#[test]
fn inserted_subtree_is_translated() {
    let fixture = Fixture::new("<p>Hello</p>", "fr");

    let list = fixture.document.create_element("ul");
    for label in ["Bye", "Save I18N_K rescue"] {
        let item = fixture.document.create_element("li");
        fixture
            .document
            .append_child(&item, &fixture.document.create_text(label));
        fixture.document.append_child(&list, &item);
    }
    fixture.document.append_child(&fixture.document.body(), &list);

    assert_eq!(fixture.document.flush_mutations(), 1);
    assert_eq!(fixture.texts(), vec!["Bonjour", "Au revoir", "Sauver"]);
    assert_eq!(carrier_of(&fixture.text_node(2)).as_deref(), Some(" I18N_K rescue"));
}

#[test]
fn edited_text_is_translated() {
    let fixture = Fixture::new("<p>Hello</p><p>Unknown</p>", "es");
    let node = fixture.text_node(1);

    fixture.document.set_text(&node, "Bye");
    assert_eq!(fixture.document.flush_mutations(), 1);

    assert_eq!(fixture.texts(), vec!["Hola", "Adiós"]);
    assert_eq!(fixture.engine.stats().text_callbacks, 1);
}

#[test]
fn edited_text_with_directive_moves_to_comment() {
    let fixture = Fixture::new("<p>Unknown</p>", "es");
    let node = fixture.text_node(0);

    fixture.document.set_text(&node, "Hello %name% I18N_D name=Ana");
    fixture.document.flush_mutations();

    assert_eq!(fixture.texts(), vec!["Hola Ana"]);
    assert_eq!(carrier_of(&node).as_deref(), Some(" I18N_D name=Ana"));
    // 注释的插入发生在暂停期间
    assert_eq!(fixture.engine.stats().node_callbacks, 0);
}

#[test]
fn change_language_does_not_trigger_observers() {
    let fixture = Fixture::new(
        "<p>Hello</p><p>Save I18N_K menu</p><p>Hello %name% I18N_D name=Bo</p>",
        "es",
    );

    for language in ["fr", "en", "es"] {
        fixture.engine.change_language(language);
        assert_eq!(fixture.document.flush_mutations(), 0);
    }

    assert_eq!(
        fixture.engine.stats(),
        EngineStats {
            text_callbacks: 0,
            node_callbacks: 0,
            passes: 4,
        }
    );
    assert!(fixture.engine.is_observing());
}

#[test]
fn stopped_observers_ignore_changes() {
    let fixture = Fixture::new("<p>Hello</p>", "es");
    fixture.engine.stop_observe();

    let node = fixture.text_node(0);
    fixture.document.set_text(&node, "Bye");
    assert_eq!(fixture.document.flush_mutations(), 0);
    assert_eq!(fixture.texts(), vec!["Bye"]);

    // 暂停与恢复不会重新打开用户关闭的观察器
    fixture.engine.change_language("fr");
    assert!(!fixture.engine.is_observing());

    fixture.engine.start_observe();
    fixture.engine.start_observe();
    fixture.document.set_text(&node, "Hello");
    assert_eq!(fixture.document.flush_mutations(), 1);
    assert_eq!(fixture.texts(), vec!["Bonjour"]);
}

#[test]
fn text_observer_alone() {
    let fixture = Fixture::new("<p>Hello</p>", "es");
    fixture.engine.stop_node_observe();

    let paragraph = child(&fixture.document.body(), 0);
    fixture
        .document
        .append_child(&paragraph, &fixture.document.create_text("Bye"));
    assert_eq!(fixture.document.flush_mutations(), 0);
    assert_eq!(fixture.texts(), vec!["Hola", "Bye"]);

    let node = fixture.text_node(1);
    fixture.document.set_text(&node, "Bye");
    assert_eq!(fixture.document.flush_mutations(), 1);
    assert_eq!(fixture.texts(), vec!["Hola", "Adiós"]);
}

#[test]
fn dropped_engine_stops_reacting() {
    let fixture = Fixture::new("<p>Hello</p>", "es");
    let document = fixture.document.clone();
    let node = fixture.text_node(0);
    drop(fixture);

    document.set_text(&node, "Bye");
    assert_eq!(document.flush_mutations(), 0);
}

#[test]
fn nodes_removed_before_checkpoint_are_skipped() {
    let fixture = Fixture::new("<p>Hello</p>", "es");
    let paragraph = child(&fixture.document.body(), 0);

    let text = fixture.document.create_text("Bye");
    fixture.document.append_child(&paragraph, &text);
    fixture.document.remove(&text);

    assert_eq!(fixture.document.flush_mutations(), 1);
    assert_eq!(
        i18n_dom::parsers::html::get_text_content(&text).as_deref(),
        Some("Bye")
    );
}

#[test]
fn edit_then_insert_in_one_batch() {
    let fixture = Fixture::new("<p>Hello</p><p>Unknown</p>", "es");
    let paragraph = child(&fixture.document.body(), 0);
    let edited = fixture.text_node(1);

    fixture.document.set_text(&edited, "Bye");
    fixture
        .document
        .append_child(&paragraph, &fixture.document.create_text("Bye"));

    // 文本回调暂停结构观察器时，已排队的插入记录仍会投递
    assert_eq!(fixture.document.flush_mutations(), 2);
    assert_eq!(fixture.texts(), vec!["Hola", "Adiós", "Adiós"]);
    assert_eq!(
        fixture.engine.stats(),
        EngineStats {
            text_callbacks: 1,
            node_callbacks: 1,
            passes: 1,
        }
    );
    assert!(!fixture.document.has_pending_mutations());
}

#[test]
fn insert_then_edit_in_one_batch() {
    let fixture = Fixture::new("<p>Hello</p><p>Unknown</p>", "es");
    let paragraph = child(&fixture.document.body(), 0);
    let edited = fixture.text_node(1);

    fixture
        .document
        .append_child(&paragraph, &fixture.document.create_text("Bye"));
    fixture.document.set_text(&edited, "Bye");

    assert_eq!(fixture.document.flush_mutations(), 2);
    assert_eq!(fixture.texts(), vec!["Hola", "Adiós", "Adiós"]);
    assert_eq!(fixture.engine.stats().text_callbacks, 1);
    assert_eq!(fixture.engine.stats().node_callbacks, 1);
    assert!(!fixture.document.has_pending_mutations());
}
