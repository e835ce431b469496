use sponge_core::model::Badge;

pub fn assign(total: u32) -> Badge {
    match total {
        t if t >= 85 => Badge::AiCollaborator,
        t if t >= 70 => Badge::OnYourWay,
        t if t >= 50 => Badge::NeedsWork,
        _ => Badge::JustVibing,
    }
}
