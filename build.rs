// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

// Use the "built" crate to record the git hash, compiler version and build
// time of the aatau-clean binary. With `built` 0.7, what gets written is
// controlled by the crate's features ("chrono" and "git2").
fn main() {
    built::write_built_file().expect("Failed to acquire build-time information");
}
