// Property-based tests for the MiniJava front end and code generator.
//
// Run all property tests:
//   cargo test --test property
//
// Run with more cases (default is 256):
//   PROPTEST_CASES=1000 cargo test --test property
