use std::path::Path;

use ctxcopy::domain::model::{ExtractionResult, Section};
use insta::assert_snapshot;

#[test]
fn rendered_blob_matches_paste_format() {
    let root = Path::new("/proj");
    let result = ExtractionResult {
        sections: vec![
            Section::new(root, &root.join("README.md"), "# Title\n".into()),
            Section::new(root, &root.join("main.py"), "print(\"hi\")".into()),
        ],
        file_count: 2,
        cancelled: false,
    };

    assert_snapshot!(result.render().trim_end(), @r###"
    ## File: README.md
    ```
    # Title

    ```

    ## File: main.py
    ```
    print("hi")
    ```
    "###);
}
