fn main() {
    // Only the espidf build needs the esp-idf environment propagated;
    // host test builds skip it.
    if std::env::var("CARGO_FEATURE_ESPIDF").is_ok() {
        embuild::espidf::sysenv::output();
    }
}
