pub mod output;

pub use output::{
    module_dir_name, render_feature_warnings, render_score_table, write_json, ArtifactWriter,
    FixAction,
};
