mod fixtures;

use acat_catalog::{Item, Loader, Updater};
use acat_domain::loadable::Loadable;
use acat_domain::status::Status;
use acat_domain::writability::Reason;
use acat_kernel::settings::{SettingsStore, keys};
use fixtures::{FakeBackend, action, registry, settings};
use std::sync::Arc;

#[test]
fn new_item_goes_to_the_first_writable_backend() {
    let settings = settings();
    let ro = Arc::new(FakeBackend::read_only("ro"));
    let rw = Arc::new(FakeBackend::writable("rw"));
    let registry = registry(&settings, &[ro, rw.clone()]);

    let mut item = action("fresh");
    item.set_label("Fresh action");
    assert!(item.is_new());

    let (status, messages) = Updater::new(&registry).write(&mut item);

    assert_eq!(status, Status::Ok);
    assert!(messages.is_empty());
    assert_eq!(*rw.written.lock(), ["fresh"]);
    assert_eq!(item.origin().unwrap().id(), "rw");
    assert!(!item.is_dirty());
    assert!(item.is_writable());
}

#[test]
fn readonly_item_is_refused() {
    let settings = settings();
    let rw = Arc::new(FakeBackend::writable("rw"));
    let registry = registry(&settings, &[rw.clone()]);

    let mut item = action("locked").with_readonly(true);
    let (status, messages) = Updater::new(&registry).write(&mut item);

    assert_eq!(status, Status::NotWillingToRun);
    assert_eq!(messages, [Reason::ItemReadonly.tooltip()]);
    assert_eq!(item.reason(), Reason::ItemReadonly);
    assert!(rw.written.lock().is_empty());
}

#[test]
fn without_writable_backend_nothing_is_written() {
    let settings = settings();
    let registry = registry(&settings, &[Arc::new(FakeBackend::read_only("ro"))]);

    let mut item = action("orphan");
    let (status, messages) = Updater::new(&registry).write(&mut item);

    assert_eq!(status, Status::NotWillingToRun);
    assert_eq!(messages, [Reason::NoProviderFound.tooltip()]);
}

#[test]
fn backend_failure_is_reported_and_item_stays_dirty() {
    let settings = settings();
    let rw = Arc::new(FakeBackend::writable("rw").with_write_status(Status::WriteError));
    let registry = registry(&settings, &[rw]);

    let mut item = action("doomed");
    item.set_enabled(false);
    let (status, messages) = Updater::new(&registry).write(&mut item);

    assert_eq!(status, Status::WriteError);
    assert_eq!(messages.len(), 1);
    assert!(item.is_dirty());
    assert!(item.is_new());
}

#[test]
fn loaded_item_is_written_back_to_its_origin() {
    let settings = settings();
    let first = Arc::new(FakeBackend::writable("first"));
    let second = Arc::new(FakeBackend::writable("second").with_items(vec![action("mine")]));
    let registry = registry(&settings, &[first.clone(), second.clone()]);

    let mut catalog = Loader::new(&registry).load(Loadable::empty()).catalog;
    let item = catalog.find_item_by_id_mut("mine").unwrap();
    item.set_label("Renamed");

    let (status, _) = Updater::new(&registry).write(item);

    assert!(status.is_ok());
    assert!(first.written.lock().is_empty());
    assert_eq!(*second.written.lock(), ["mine"]);
}

#[test]
fn released_origin_reads_as_unavailable() {
    let settings = settings();
    let rw = Arc::new(FakeBackend::writable("rw").with_items(vec![action("x")]));
    let registry = registry(&settings, &[rw]);

    let mut item = Loader::new(&registry).load(Loadable::empty()).catalog.into_items().remove(0);
    registry.release();

    let (status, messages) = Updater::new(&registry).write(&mut item);

    assert_eq!(status, Status::NotWillingToRun);
    assert_eq!(messages, [Reason::Unavailable.tooltip()]);
}

#[test]
fn delete_calls_the_origin_backend() {
    let settings = settings();
    let rw = Arc::new(FakeBackend::writable("rw").with_items(vec![action("gone")]));
    let registry = registry(&settings, &[rw.clone()]);
    let catalog = Loader::new(&registry).load(Loadable::empty()).catalog;
    let updater = Updater::new(&registry);

    let (status, _) = updater.delete(catalog.find_item_by_id("gone").unwrap());
    assert!(status.is_ok());
    assert_eq!(*rw.deleted.lock(), ["gone"]);

    let (status, _) = updater.delete(&action("never-stored"));
    assert!(status.is_ok());
    assert_eq!(rw.deleted.lock().len(), 1);
}

#[test]
fn delete_from_readonly_backend_is_refused() {
    let settings = settings();
    let ro = Arc::new(FakeBackend::read_only("ro").with_items(vec![action("kept")]));
    let registry = registry(&settings, &[ro.clone()]);
    let catalog = Loader::new(&registry).load(Loadable::empty()).catalog;

    let (status, messages) = Updater::new(&registry).delete(&catalog.items()[0]);

    assert_eq!(status, Status::NotWillingToRun);
    assert_eq!(messages, [Reason::IncompleteApi.tooltip()]);
    assert!(ro.deleted.lock().is_empty());
}

#[test]
fn duplicate_data_uses_the_source_backend() {
    let settings = settings();
    let rw = Arc::new(FakeBackend::writable("rw").with_items(vec![action("src")]));
    let registry = registry(&settings, &[rw.clone()]);
    let catalog = Loader::new(&registry).load(Loadable::empty()).catalog;
    let updater = Updater::new(&registry);

    let (status, _) = updater.duplicate_data(&action("copy"), catalog.find_item_by_id("src").unwrap());
    assert!(status.is_ok());
    assert_eq!(*rw.duplicated.lock(), [("copy".to_owned(), "src".to_owned())]);

    let (status, _) = updater.duplicate_data(&action("copy"), &action("unsaved"));
    assert!(status.is_ok());
    assert_eq!(rw.duplicated.lock().len(), 1);
}

#[test]
fn level_zero_write_honours_the_mandatory_flag() {
    let settings = settings();
    let registry = registry(&settings, &[]);
    let items = [Item::menu("b", "B"), Item::menu("a", "A")];

    let updater = Updater::new(&registry);
    assert!(updater.is_level_zero_writable());
    assert!(updater.write_level_zero(&items));
    assert_eq!(settings.get_string_list(keys::LEVEL_ZERO_ORDER, None).unwrap().value, ["b", "a"]);

    let locked = fixtures::settings();
    locked.mandate_list(keys::LEVEL_ZERO_ORDER, None, &["a"]);
    let registry = fixtures::registry(&locked, &[]);
    let updater = Updater::new(&registry);
    assert!(!updater.is_level_zero_writable());
    assert!(!updater.write_level_zero(&items));
}

#[test]
fn new_top_level_item_is_refused_when_level_zero_is_locked() {
    let settings = settings();
    settings.mandate_list(keys::LEVEL_ZERO_ORDER, None, &[]);
    let rw = Arc::new(FakeBackend::writable("rw"));
    let registry = registry(&settings, &[rw]);

    let mut item = action("top");
    let (status, messages) = Updater::new(&registry).write(&mut item);

    assert_eq!(status, Status::NotWillingToRun);
    assert_eq!(messages, [Reason::LevelZero.tooltip()]);
}
