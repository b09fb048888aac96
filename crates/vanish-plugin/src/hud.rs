//! Scoreboard counter of online players as seen by each viewer.

use vanish_core::host::PlayerDirectory;
use vanish_core::VanishManager;
use vanish_plugin_api::ServerApi;

use crate::bridge::ApiDirectory;

pub const FAKE_COUNT_TAG: &str = "vanish.fake_count";

pub(crate) fn refresh(manager: &VanishManager, api: &mut dyn ServerApi) {
    let counts: Vec<(String, usize)> = {
        let directory = ApiDirectory::new(&*api);
        directory
            .online()
            .into_iter()
            .map(|p| {
                let count = manager.visible_count_for(&directory, &p.name);
                (p.name, count)
            })
            .collect()
    };
    for (name, count) in counts {
        api.set_score_tag(&name, FAKE_COUNT_TAG, &count.to_string());
    }
}
