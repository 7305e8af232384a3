use cloudnotes::application::clock::FixedClock;
use cloudnotes::application::NoteStore;
use cloudnotes::domain::{ImageFile, NoteRecord};
use cloudnotes::util::testing::{self, record, MockObjectStorage, MockQueryExecutor};

pub type TestStore = NoteStore<MockQueryExecutor, MockObjectStorage>;

/// Timestamp every upload in the tests is stamped with
#[allow(dead_code)]
pub const NOW_MILLIS: i64 = 1_700_000_000_000;

#[ctor::ctor]
fn init() {
    testing::init_test_setup().expect("Failed to initialize test setup");
}

/// Store over mocks that already hold the golden dataset
#[allow(dead_code)]
pub fn seeded_store() -> TestStore {
    let executor = golden_notes()
        .into_iter()
        .fold(MockQueryExecutor::builder(), |b, note| b.with_note(note))
        .build();
    let storage = MockObjectStorage::builder()
        .with_object(test_notes::CAT_KEY)
        .with_object(test_notes::RECEIPT_KEY)
        .build();
    store_over(executor, storage)
}

#[allow(dead_code)]
pub fn store_over(executor: MockQueryExecutor, storage: MockObjectStorage) -> TestStore {
    NoteStore::new(executor, storage).with_clock(FixedClock(NOW_MILLIS))
}

#[allow(dead_code)]
pub fn golden_notes() -> Vec<NoteRecord> {
    vec![
        record(test_notes::CAT, "Cat", "Feed the cat\ntwice a day", Some(test_notes::CAT_KEY)),
        record(test_notes::GROCERIES, "Groceries", "milk, eggs", None),
        record(test_notes::RECEIPT, "Receipt", "Hardware store", Some(test_notes::RECEIPT_KEY)),
    ]
}

#[allow(dead_code)]
pub fn png(size: usize) -> ImageFile {
    ImageFile::new("photo.png", "image/png", vec![0u8; size])
}

/// Known test note IDs and keys from the golden dataset
#[allow(dead_code)]
pub mod test_notes {
    pub const CAT: &str = "0b6c7e1e-cat";
    pub const CAT_KEY: &str = "public/1695797540370_cat.png";

    pub const GROCERIES: &str = "4f1d2a9b-groceries";

    pub const RECEIPT: &str = "9a8e7f60-receipt";
    pub const RECEIPT_KEY: &str = "public/1713763428669_receipt scan (2).jpg";

    pub const NONEXISTENT: &str = "does-not-exist";
}
