use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use futures_util::future::LocalBoxFuture;
use indexmap::IndexMap;
use multiroot_editor::multiroot_engine::ModelError;
use multiroot_editor::multiroot_ui::{AttachmentState, UiError};
use multiroot_editor::{
    ConfigError, Container, DataSelector, EditorConfig, EditorData, EditorError, EditorState,
    FileStore, MultiRootEditor, Plugin, PluginContext, RootsData, SmolStr, builtin_plugins,
};

fn containers(entries: &[(&str, &str)]) -> IndexMap<SmolStr, Container> {
    entries
        .iter()
        .map(|(name, content)| (SmolStr::new(name), Container::with_content("div", *content)))
        .collect()
}

async fn editor(entries: &[(&str, &str)]) -> MultiRootEditor {
    MultiRootEditor::create(containers(entries), EditorConfig::default())
        .await
        .unwrap()
}

fn roots(entries: &[(&str, &str)]) -> RootsData {
    entries
        .iter()
        .map(|(name, data)| (SmolStr::new(name), data.to_string()))
        .collect()
}

#[tokio::test]
async fn test_end_to_end() {
    let set = containers(&[("header", "<div>H</div>")]);
    let header = set["header"].clone();
    let editor = MultiRootEditor::create(set, EditorConfig::default())
        .await
        .unwrap();

    assert_eq!(editor.state(), EditorState::Ready);
    insta::assert_snapshot!(editor.root_data("header").unwrap(), @"<p>H</p>");

    editor.set_data("header", "<p>X</p>").unwrap();
    insta::assert_snapshot!(editor.root_data("header").unwrap(), @"<p>X</p>");

    let removed = editor.remove("header").unwrap();
    assert_eq!(removed.name(), "header");
    assert!(!removed.is_attached());
    assert_eq!(header.data(), "<p>X</p>");
    assert_eq!(header.attribute("contenteditable"), None);
    assert!(editor.root_names().is_empty());
    editor.check_consistency().unwrap();
}

#[tokio::test]
async fn test_add_parses_container_content() {
    let editor = editor(&[("a", "<p>A</p>")]).await;

    editor
        .add(containers(&[("b", "intro <b>bold</b>")]))
        .unwrap();

    insta::assert_snapshot!(editor.root_data("b").unwrap(), @"<p>intro <strong>bold</strong></p>");
    assert_eq!(editor.ui().state("b"), Some(AttachmentState::Bound));
    assert!(editor.ui().editable("b").unwrap().is_rendered());
    editor.check_consistency().unwrap();
}

#[tokio::test]
async fn test_remove_leaves_other_roots_alone() {
    let editor = editor(&[("a", "<p>A</p>"), ("b", "<p>B</p>"), ("c", "<p>C</p>")]).await;

    editor.remove("b").unwrap();

    assert_eq!(
        editor.all_data().unwrap(),
        roots(&[("a", "<p>A</p>"), ("c", "<p>C</p>")])
    );
    editor.check_consistency().unwrap();
}

#[tokio::test]
async fn test_remove_writes_latest_content_back() {
    let set = containers(&[("a", "<p>one</p>")]);
    let container = set["a"].clone();
    let editor = MultiRootEditor::create(set, EditorConfig::default())
        .await
        .unwrap();

    editor.append_data("a", "<p>two</p>").unwrap();
    editor.append_data_in_first("a", "<h1>Title</h1>").unwrap();
    editor.remove("a").unwrap();

    insta::assert_snapshot!(container.data(), @"<h1>Title</h1><p>one</p><p>two</p>");
}

#[tokio::test]
async fn test_readded_root_is_independent() {
    let editor = editor(&[("a", "<p>old</p>"), ("b", "<p>B</p>")]).await;
    editor.append_data("a", "<p>more</p>").unwrap();
    editor.remove("a").unwrap();

    editor.add(containers(&[("a", "<p>new</p>")])).unwrap();

    assert_eq!(editor.root_data("a").unwrap(), "<p>new</p>");
    assert_eq!(editor.root_names(), vec![SmolStr::new("b"), SmolStr::new("a")]);
    editor.check_consistency().unwrap();
}

#[tokio::test]
async fn test_remove_bumps_version_by_one() {
    let editor = editor(&[("a", "<p>A</p>"), ("b", "")]).await;

    let before = editor.version();
    editor.remove("a").unwrap();
    assert_eq!(editor.version(), before + 1);

    let before = editor.version();
    editor.remove("b").unwrap();
    assert_eq!(editor.version(), before + 1);
}

#[tokio::test]
async fn test_version_never_decreases() {
    let editor = editor(&[("a", "<p>A</p>")]).await;
    let mut last = editor.version();

    let mut check = |editor: &MultiRootEditor| {
        let now = editor.version();
        assert!(now >= last);
        last = now;
    };
    editor.set_data("a", "<p>B</p>").unwrap();
    check(&editor);
    editor.add(containers(&[("b", "<p>C</p>")])).unwrap();
    check(&editor);
    editor.remove("a").unwrap();
    check(&editor);
    editor.set_data("b", "").unwrap();
    check(&editor);
}

#[tokio::test]
async fn test_sticky_focus() {
    let editor = editor(&[("a", "<p>A</p>"), ("b", "<p>B</p>")]).await;
    let ui = editor.ui();
    let tracker = ui.focus_tracker();

    tracker.focus(ui.editable("a").unwrap().element());
    tracker.focus(ui.view().toolbar().element());

    assert!(tracker.is_focused());
    assert_eq!(editor.is_focused("a"), Some(true));
    assert_eq!(editor.is_focused("b"), Some(false));
    assert_eq!(editor.last_focused_root().as_deref(), Some("a"));

    tracker.focus(ui.editable("b").unwrap().element());
    assert_eq!(editor.is_focused("a"), Some(false));
    assert_eq!(editor.is_focused("b"), Some(true));

    tracker.blur();
    assert_eq!(editor.is_focused("b"), Some(false));
    assert_eq!(editor.last_focused_root(), None);
}

#[tokio::test]
async fn test_removing_focused_root_releases_focus() {
    let editor = editor(&[("a", "<p>A</p>"), ("b", "<p>B</p>")]).await;
    let ui = editor.ui();
    let element = ui.editable("a").unwrap().element();
    ui.focus_tracker().focus(element);

    editor.remove("a").unwrap();

    assert!(!ui.focus_tracker().contains(element));
    assert!(!ui.focus_tracker().is_focused());
    assert_eq!(editor.last_focused_root(), None);
    assert_eq!(editor.is_focused("b"), Some(false));

    // Focus still works for the root that stayed.
    ui.focus_tracker().focus(ui.editable("b").unwrap().element());
    assert_eq!(editor.is_focused("b"), Some(true));
}

#[tokio::test]
async fn test_destroy_writes_data_back() {
    let set = containers(&[("a", "<p>A</p>"), ("b", "<p>B</p>")]);
    let (a, b) = (set["a"].clone(), set["b"].clone());
    let editor = MultiRootEditor::create(set, EditorConfig::default())
        .await
        .unwrap();
    editor.set_data("a", "<p>edited a</p>").unwrap();
    editor.append_data("b", "<p>more b</p>").unwrap();

    editor.destroy().await.unwrap();

    assert_eq!(a.data(), "<p>edited a</p>");
    assert_eq!(b.data(), "<p>B</p><p>more b</p>");
    assert_eq!(a.attribute("contenteditable"), None);
    assert_eq!(editor.state(), EditorState::Destroyed);
    assert!(editor.model().root_names().is_empty());
    assert!(editor.editing().attached_names().is_empty());
}

#[tokio::test]
async fn test_destroyed_editor_rejects_operations() {
    let editor = editor(&[("a", "<p>A</p>")]).await;
    editor.destroy().await.unwrap();

    assert!(matches!(editor.destroy().await, Err(EditorError::Destroyed)));
    assert!(matches!(
        editor.set_data("a", "x"),
        Err(EditorError::Destroyed)
    ));
    assert!(matches!(editor.get_data(""), Err(EditorError::Destroyed)));
    assert!(matches!(editor.remove("a"), Err(EditorError::Destroyed)));
    assert!(matches!(
        editor.add(containers(&[("b", "")])),
        Err(EditorError::Destroyed)
    ));
}

#[tokio::test]
async fn test_get_data_selectors() {
    let editor = editor(&[("a", "<p>A</p>"), ("b", "<p>B</p>"), ("c", "")]).await;

    let all = editor.get_data("").unwrap().into_roots().unwrap();
    assert_eq!(
        all.keys().cloned().collect::<Vec<_>>(),
        editor.root_names()
    );
    assert_eq!(editor.get_data(DataSelector::All).unwrap(), EditorData::Roots(all));

    assert_eq!(
        editor.get_data(["a", "b"]).unwrap(),
        EditorData::Roots(roots(&[("a", "<p>A</p>"), ("b", "<p>B</p>")]))
    );
    assert_eq!(
        editor.get_data("a").unwrap(),
        EditorData::Root("<p>A</p>".to_owned())
    );
    assert_eq!(editor.get_data("c").unwrap().as_root(), Some(""));
    assert_eq!(
        editor.get_data(Vec::<&str>::new()).unwrap(),
        EditorData::Roots(RootsData::new())
    );
    assert!(matches!(
        editor.get_data(["a", "zzz"]),
        Err(EditorError::RootNotFound { name }) if name == "zzz"
    ));
}

#[tokio::test]
async fn test_mutations_reject_unknown_roots() {
    let editor = editor(&[("a", "<p>A</p>")]).await;
    let version = editor.version();

    for result in [
        editor.set_data("nope", "<p>x</p>"),
        editor.append_data("nope", "<p>x</p>"),
        editor.append_data_in_first("nope", "<p>x</p>"),
    ] {
        assert!(matches!(result, Err(EditorError::RootNotFound { name }) if name == "nope"));
    }
    assert!(matches!(
        editor.remove("nope"),
        Err(EditorError::RootNotFound { .. })
    ));
    assert_eq!(editor.version(), version);
}

#[tokio::test]
async fn test_set_data_with_empty_content_clears_root() {
    let editor = editor(&[("a", "<p>A</p><p>B</p>")]).await;
    editor.set_data("a", "").unwrap();
    assert_eq!(editor.root_data("a").unwrap(), "");
}

#[tokio::test]
async fn test_add_existing_name_fails_without_side_effects() {
    let editor = editor(&[("a", "<p>A</p>")]).await;
    let version = editor.version();

    let err = editor
        .add(containers(&[("b", "<p>B</p>"), ("a", "<p>again</p>")]))
        .unwrap_err();

    assert!(matches!(
        err,
        EditorError::Model(ModelError::DuplicateRoot { ref name }) if name == "a"
    ));
    assert_eq!(editor.root_names(), vec![SmolStr::new("a")]);
    assert!(!editor.model().has_root("b"));
    assert_eq!(editor.root_data("a").unwrap(), "<p>A</p>");
    assert_eq!(editor.version(), version);
    editor.check_consistency().unwrap();
}

#[tokio::test]
async fn test_reading_data_inside_a_model_change_fails() {
    let editor = editor(&[("a", "<p>A</p>")]).await;
    let seen: Rc<RefCell<Vec<Result<EditorData, EditorError>>>> = Rc::default();
    let sink = seen.clone();
    let inner = editor.clone();

    editor
        .model()
        .enqueue_change(move |_writer| {
            sink.borrow_mut().push(inner.get_data("a"));
            Ok(())
        })
        .unwrap();

    assert!(matches!(
        seen.borrow()[0],
        Err(EditorError::Model(ModelError::ChangeInProgress))
    ));
    assert_eq!(editor.root_data("a").unwrap(), "<p>A</p>");

    // Removing a root from inside a change leaves every registry intact.
    let remove: Rc<RefCell<Option<Result<(), EditorError>>>> = Rc::default();
    let sink = remove.clone();
    let inner = editor.clone();
    editor
        .model()
        .enqueue_change(move |_writer| {
            *sink.borrow_mut() = Some(inner.remove("a").map(|_| ()));
            Ok(())
        })
        .unwrap();
    assert!(matches!(
        *remove.borrow(),
        Some(Err(EditorError::Model(ModelError::ChangeInProgress)))
    ));
    assert_eq!(editor.root_names(), vec![SmolStr::new("a")]);
    editor.check_consistency().unwrap();
}

#[tokio::test]
async fn test_container_shared_by_two_roots_is_rejected() {
    let editor = editor(&[("a", "<p>A</p>")]).await;
    let version = editor.version();
    let shared = Container::with_content("div", "<p>S</p>");

    let mut batch = IndexMap::new();
    batch.insert(SmolStr::new("x"), shared.clone());
    batch.insert(SmolStr::new("y"), shared.clone());
    let err = editor.add(batch).unwrap_err();
    assert!(matches!(
        err,
        EditorError::Ui(UiError::ContainerInUse { ref name, ref holder })
            if name == "y" && holder == "x"
    ));
    assert_eq!(editor.root_names(), vec![SmolStr::new("a")]);
    assert!(!editor.model().has_root("x"));
    assert_eq!(editor.version(), version);
    editor.check_consistency().unwrap();

    // A container already hosting a root cannot take a second one.
    let taken = editor.containers()["a"].clone();
    let mut batch = IndexMap::new();
    batch.insert(SmolStr::new("b"), taken);
    assert!(matches!(
        editor.add(batch),
        Err(EditorError::Ui(UiError::ContainerInUse { .. }))
    ));

    // Once its root is gone the container is free again.
    let mut batch = IndexMap::new();
    batch.insert(SmolStr::new("x"), shared.clone());
    editor.add(batch).unwrap();
    editor.remove("x").unwrap();
    let mut batch = IndexMap::new();
    batch.insert(SmolStr::new("y"), shared);
    editor.add(batch).unwrap();
    let element = editor.ui().editable("y").unwrap().element();
    assert!(editor.ui().focus_tracker().contains(element));
    editor.check_consistency().unwrap();
}

#[tokio::test]
async fn test_on_change_receives_snapshots() {
    let editor = editor(&[("a", "<p>A</p>"), ("b", "")]).await;
    let seen: Rc<RefCell<Vec<RootsData>>> = Rc::default();
    let sink = seen.clone();
    let id = editor
        .on_change(move |data| sink.borrow_mut().push(data.clone()))
        .unwrap();

    editor.set_data("b", "<p>B</p>").unwrap();
    assert_eq!(seen.borrow().len(), 1);
    assert_eq!(
        seen.borrow()[0],
        roots(&[("a", "<p>A</p>"), ("b", "<p>B</p>")])
    );

    assert!(editor.off_change(id));
    editor.set_data("b", "<p>C</p>").unwrap();
    assert_eq!(seen.borrow().len(), 1);
}

#[tokio::test]
async fn test_create_wires_toolbar_and_placeholders() {
    let config = EditorConfig::from_json_str(
        r#"{
            "toolbar": { "items": ["bold", "italic", "|", "blockQuote", "missing"] },
            "placeholder": { "title": "Title here" }
        }"#,
    )
    .unwrap();
    let mut set = containers(&[("title", "")]);
    set.insert(
        "notes".into(),
        Container::new("textarea").with_attribute("placeholder", "Notes..."),
    );

    let editor = MultiRootEditor::create(set, config).await.unwrap();

    insta::assert_snapshot!(
        editor.ui().view().toolbar().item_names().join(" "),
        @"bold italic | blockQuote"
    );
    assert_eq!(editor.editing().placeholder("title").as_deref(), Some("Title here"));
    assert_eq!(editor.editing().placeholder("notes").as_deref(), Some("Notes..."));

    editor
        .add(IndexMap::from([(
            SmolStr::new("extra"),
            Container::new("textarea").with_attribute("placeholder", "Extra"),
        )]))
        .unwrap();
    assert_eq!(editor.editing().placeholder("extra").as_deref(), Some("Extra"));
}

#[tokio::test]
async fn test_remove_plugins_from_config() {
    let config = EditorConfig {
        remove_plugins: vec!["BlockQuote".into()],
        toolbar: ["bold", "blockQuote"].into_iter().collect(),
        ..Default::default()
    };
    let editor = MultiRootEditor::create(containers(&[("a", "")]), config)
        .await
        .unwrap();

    assert_eq!(editor.plugins().names(), vec![SmolStr::new("BasicStyles")]);
    assert!(!editor.components().has("blockQuote"));
    assert_eq!(
        editor.ui().view().toolbar().item_names(),
        vec![SmolStr::new("bold")]
    );
}

type Log = Rc<RefCell<Vec<String>>>;

struct Recording {
    log: Log,
}

impl Plugin for Recording {
    fn name(&self) -> &str {
        "Recording"
    }

    fn init<'a>(
        &'a self,
        context: &'a PluginContext,
    ) -> LocalBoxFuture<'a, Result<(), EditorError>> {
        Box::pin(async move {
            let roots = context.model.root_names().join(",");
            self.log.borrow_mut().push(format!("init roots={roots}"));
            Ok::<_, EditorError>(())
        })
    }

    fn after_ready(&self) {
        self.log.borrow_mut().push("ready".to_owned());
    }

    fn destroy(&self) {
        self.log.borrow_mut().push("destroy".to_owned());
    }
}

struct Failing;

impl Plugin for Failing {
    fn name(&self) -> &str {
        "Failing"
    }

    fn init<'a>(&'a self, _: &'a PluginContext) -> LocalBoxFuture<'a, Result<(), EditorError>> {
        Box::pin(async { Err::<(), _>(EditorError::plugin("Failing", "refusing to start")) })
    }
}

#[tokio::test]
async fn test_plugin_lifecycle() {
    let log = Log::default();
    let mut plugins = builtin_plugins();
    plugins.push(Rc::new(Recording { log: log.clone() }));

    let editor = MultiRootEditor::create_with_plugins(
        containers(&[("a", ""), ("b", "")]),
        EditorConfig::default(),
        plugins,
    )
    .await
    .unwrap();
    editor.destroy().await.unwrap();

    assert_eq!(*log.borrow(), vec!["init roots=a,b", "ready", "destroy"]);
}

#[tokio::test]
async fn test_failing_phase_aborts_create() {
    let set = containers(&[("a", "<p>A</p>")]);
    let container = set["a"].clone();

    let err = MultiRootEditor::create_with_plugins(
        set,
        EditorConfig::default(),
        vec![Rc::new(Failing) as Rc<dyn Plugin>],
    )
    .await
    .unwrap_err();

    assert!(matches!(err, EditorError::Plugin { ref name, .. } if name == "Failing"));
    // UI initialization never ran.
    assert_eq!(container.attribute("contenteditable"), None);
    assert_eq!(container.data(), "<p>A</p>");
}

#[tokio::test]
async fn test_config_file_loading() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        r#"
toolbar = ["italic", "-", "code"]
removePlugins = ["BlockQuote"]

[placeholder]
body = "Start writing"
"#
    )
    .unwrap();

    let config = EditorConfig::load(&FileStore::new(file.path())).await.unwrap();
    assert_eq!(config.remove_plugins, vec![SmolStr::new("BlockQuote")]);

    let editor = MultiRootEditor::create(containers(&[("body", "")]), config)
        .await
        .unwrap();
    insta::assert_snapshot!(
        editor.ui().view().toolbar().item_names().join(" "),
        @"italic - code"
    );
    assert_eq!(
        editor.editing().placeholder("body").as_deref(),
        Some("Start writing")
    );
}

#[tokio::test]
async fn test_config_unsupported_format() {
    let err = EditorConfig::load(&FileStore::new("editor.yaml"))
        .await
        .unwrap_err();
    assert!(matches!(err, ConfigError::UnsupportedFormat { ref extension } if extension == "yaml"));
}
