use chrono::NaiveDate;
use clap::Args;
use opj_capture_application::{FieldService, capture_list_title};
use opj_capture_core::{AppError, AppResult};
use opj_capture_domain::{
    Bandit, BanditDraft, BanditId, Capture, CaptureDraft, CaptureId, Infraction, InfractionDraft,
    InfractionId, PasswordChange, Role, Sexe,
};

/// Fields of a new bandit record.
#[derive(Debug, Args)]
pub struct NewBandit {
    /// Family name
    pub nom: String,
    /// Alias
    #[arg(short, long)]
    pub surnom: Option<String>,
    /// Sex, M or F
    #[arg(long, value_parser = parse_sexe, default_value = "M")]
    pub sexe: Sexe,
    /// Birth date, YYYY-MM-DD
    #[arg(long)]
    pub date_naissance: Option<NaiveDate>,
    /// Current state, e.g. "En fuite"
    #[arg(long)]
    pub etat: Option<String>,
    /// Photo reference
    #[arg(long)]
    pub photo: Option<String>,
    /// Linked infraction id, repeatable
    #[arg(long = "infraction")]
    pub infractions: Vec<i64>,
}

impl NewBandit {
    fn into_draft(self) -> AppResult<BanditDraft> {
        let mut draft = BanditDraft::new(self.nom)?.with_sexe(self.sexe);
        if let Some(surnom) = self.surnom {
            draft = draft.with_surnom(surnom);
        }
        if let Some(date_naissance) = self.date_naissance {
            draft = draft.with_date_naissance(date_naissance);
        }
        if let Some(etat) = self.etat {
            draft = draft.with_etat(etat);
        }
        if let Some(photo) = self.photo {
            draft = draft.with_photo(photo);
        }
        for infraction_id in self.infractions.into_iter().map(InfractionId::new) {
            if !draft.infractions().contains(&infraction_id) {
                draft.toggle_infraction(infraction_id);
            }
        }
        Ok(draft)
    }
}

fn parse_sexe(value: &str) -> Result<Sexe, String> {
    Sexe::from_transport(value).ok_or_else(|| format!("expected M or F, got '{value}'"))
}

/// Fields of a new capture report.
#[derive(Debug, Args)]
pub struct NewCapture {
    /// Captured bandit id
    #[arg(long)]
    pub bandit: i64,
    /// Infraction id
    #[arg(long)]
    pub infraction: i64,
    /// Circumstances of the capture
    #[arg(short, long)]
    pub description: String,
    /// Photo as a base64 data:image URI
    #[arg(long)]
    pub photo: Option<String>,
    /// GPS latitude
    #[arg(long, requires = "longitude", allow_negative_numbers = true)]
    pub latitude: Option<f64>,
    /// GPS longitude
    #[arg(long, requires = "latitude", allow_negative_numbers = true)]
    pub longitude: Option<f64>,
    /// Typed address when no GPS position is available
    #[arg(long, conflicts_with_all = ["latitude", "longitude"])]
    pub address: Option<String>,
}

impl NewCapture {
    fn into_draft(self) -> AppResult<CaptureDraft> {
        let mut draft = CaptureDraft::new(
            BanditId::new(self.bandit),
            InfractionId::new(self.infraction),
            self.description,
        )?;
        if let Some(photo) = self.photo {
            draft = draft.with_photo(photo)?;
        }
        if let (Some(latitude), Some(longitude)) = (self.latitude, self.longitude) {
            draft = draft.with_coordinates(latitude, longitude)?;
        } else if let Some(address) = self.address {
            draft = draft.with_address(address);
        }
        Ok(draft)
    }
}

pub async fn login(service: &FieldService, email: &str, password: &str) -> AppResult<()> {
    let actor = service.login(email, password).await?;
    println!(
        "Connecté: {} ({})",
        actor.display_name(),
        actor.role().label()
    );
    Ok(())
}

pub async fn logout(service: &FieldService) -> AppResult<()> {
    service.logout().await?;
    println!("Déconnecté");
    Ok(())
}

pub async fn whoami(service: &FieldService) -> AppResult<()> {
    let actor = service.current_actor().await?;
    let role = actor.role();

    println!("{} #{}", actor.display_name(), actor.id());
    println!("Rôle: {} [{}] ({})", Role::label_for(Some(role)), role, Role::icon_for(Some(role)));
    if let Some(email) = actor.email() {
        println!("Email: {email}");
    }
    if let Some(matricule) = actor.matricule() {
        println!("Matricule: {matricule}");
    }

    println!("Permissions:");
    for capability in actor.permissions().granted() {
        println!("  {}", capability.as_str());
    }
    Ok(())
}

pub async fn bandits(service: &FieldService, query: Option<&str>) -> AppResult<()> {
    let listing = service.bandit_listing().await?;
    let bandits: Vec<&Bandit> = listing
        .bandits
        .iter()
        .filter(|bandit| query.is_none_or(|query| bandit.matches_query(query)))
        .collect();

    println!("Bandits ({})", bandits.len());
    for bandit in bandits {
        print_bandit(bandit);
    }
    Ok(())
}

pub async fn captures(service: &FieldService) -> AppResult<()> {
    let actor = service.current_actor().await?;
    let captures = service.visible_captures().await?;

    println!(
        "{} ({})",
        capture_list_title(Some(actor.role())),
        captures.len()
    );
    for capture in &captures {
        print_capture(capture);
    }
    Ok(())
}

pub async fn validated(service: &FieldService) -> AppResult<()> {
    let captures = service.validated_captures().await?;

    println!("Captures validées ({})", captures.len());
    for capture in &captures {
        print_capture(capture);
    }
    Ok(())
}

pub async fn infractions(service: &FieldService) -> AppResult<()> {
    let infractions = service.infractions().await?;

    println!("Infractions ({})", infractions.len());
    for infraction in &infractions {
        print_infraction(infraction);
    }
    Ok(())
}

pub async fn dashboard(service: &FieldService) -> AppResult<()> {
    let summary = service.dashboard().await?;

    println!("Captures: {}", summary.capture_count);
    println!("Captures validées: {}", summary.validated_capture_count);
    println!("Bandits: {}", summary.bandit_count);
    Ok(())
}

pub async fn create_bandit(service: &FieldService, bandit: NewBandit) -> AppResult<()> {
    let draft = bandit.into_draft()?;
    service.save_bandit(None, &draft).await?;
    println!("Bandit enregistré: {}", draft.nom());
    Ok(())
}

pub async fn delete_bandit(service: &FieldService, id: i64) -> AppResult<()> {
    let listing = service.bandit_listing().await?;
    let bandit = listing
        .bandits
        .iter()
        .find(|bandit| bandit.id().get() == id)
        .ok_or_else(|| AppError::NotFound(format!("bandit #{id} is not visible")))?;

    service.delete_bandit(bandit).await?;
    println!("Bandit #{id} supprimé");
    Ok(())
}

pub async fn delete_capture(service: &FieldService, id: i64) -> AppResult<()> {
    let captures = service.visible_captures().await?;
    let capture = captures
        .iter()
        .find(|capture| capture.id().get() == id)
        .ok_or_else(|| AppError::NotFound(format!("capture #{id} is not visible")))?;

    service.delete_capture(capture).await?;
    println!("Capture #{id} supprimée");
    Ok(())
}

pub async fn create_capture(service: &FieldService, capture: NewCapture) -> AppResult<()> {
    let draft = capture.into_draft()?;
    service.create_capture(&draft).await?;
    println!("Capture enregistrée pour le bandit #{}", draft.bandit_id());
    Ok(())
}

pub async fn reject_capture(service: &FieldService, id: i64) -> AppResult<()> {
    service.reject_capture(CaptureId::new(id)).await?;
    println!("Capture #{id} rejetée");
    Ok(())
}

pub async fn comment_capture(service: &FieldService, id: i64, comment: &str) -> AppResult<()> {
    service.comment_capture(CaptureId::new(id), comment).await?;
    println!("Commentaire ajouté à la capture #{id}");
    Ok(())
}

pub async fn create_infraction(
    service: &FieldService,
    libelle: String,
    description: String,
) -> AppResult<()> {
    let draft = InfractionDraft::new(libelle, description)?;
    service.save_infraction(None, &draft).await?;
    println!("Infraction créée: {}", draft.libelle());
    Ok(())
}

pub async fn delete_infraction(service: &FieldService, id: i64) -> AppResult<()> {
    let infractions = service.infractions().await?;
    let infraction = infractions
        .iter()
        .find(|infraction| infraction.id().get() == id)
        .ok_or_else(|| AppError::NotFound(format!("infraction #{id} does not exist")))?;

    service.delete_infraction(infraction).await?;
    println!("Infraction #{id} supprimée");
    Ok(())
}

pub async fn approve_infraction(service: &FieldService, id: i64) -> AppResult<()> {
    service.approve_infraction(InfractionId::new(id)).await?;
    println!("Infraction #{id} approuvée");
    Ok(())
}

pub async fn reject_infraction(service: &FieldService, id: i64) -> AppResult<()> {
    service.reject_infraction(InfractionId::new(id)).await?;
    println!("Infraction #{id} rejetée");
    Ok(())
}

pub async fn change_password(
    service: &FieldService,
    current: String,
    new: String,
    confirm: String,
) -> AppResult<()> {
    let change = PasswordChange::new(current, new, confirm)?;
    service.change_password(&change).await?;
    println!("Mot de passe modifié");
    Ok(())
}

fn print_bandit(bandit: &Bandit) {
    let mut line = format!("#{} {}", bandit.id(), bandit.nom());
    if let Some(surnom) = bandit.surnom() {
        line.push_str(format!(" \"{surnom}\"").as_str());
    }
    if let Some(sexe) = bandit.sexe() {
        line.push_str(format!(" [{}]", sexe.label()).as_str());
    }
    if let Some(etat) = bandit.etat() {
        line.push_str(format!(" {etat}").as_str());
    }
    println!("  {line}");
}

fn print_capture(capture: &Capture) {
    println!(
        "  #{} {} | {} | {} | {} | {}",
        capture.id(),
        capture.bandit_nom().unwrap_or("-"),
        capture.officer_name().unwrap_or("-"),
        capture.lieu_capture().unwrap_or("-"),
        capture.date_capture().unwrap_or("-"),
        capture.status().as_str()
    );
}

fn print_infraction(infraction: &Infraction) {
    let approval = if infraction.is_approved() {
        infraction
            .approved_by()
            .map_or_else(|| "approuvée".to_owned(), |name| format!("approuvée par {name}"))
    } else {
        "en attente".to_owned()
    };
    println!("  #{} {} ({approval})", infraction.id(), infraction.libelle());
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use opj_capture_core::AppError;
    use opj_capture_domain::{CaptureLocation, InfractionId, Sexe};

    use super::{NewBandit, NewCapture};

    #[derive(Parser)]
    struct BanditForm {
        #[command(flatten)]
        bandit: NewBandit,
    }

    #[derive(Parser)]
    struct CaptureForm {
        #[command(flatten)]
        capture: NewCapture,
    }

    fn capture_form(args: &[&str]) -> Result<NewCapture, clap::Error> {
        CaptureForm::try_parse_from(std::iter::once("create-capture").chain(args.iter().copied()))
            .map(|form| form.capture)
    }

    #[test]
    fn bandit_form_builds_a_draft() {
        let form = BanditForm::try_parse_from([
            "create-bandit",
            "Mbala",
            "--surnom",
            "Le Rapide",
            "--sexe",
            "F",
            "--date-naissance",
            "1990-04-12",
            "--infraction",
            "4",
            "--infraction",
            "4",
            "--infraction",
            "9",
        ])
        .unwrap_or_else(|_| unreachable!());

        let draft = form.bandit.into_draft().unwrap_or_else(|_| unreachable!());
        assert_eq!(draft.nom(), "Mbala");
        assert_eq!(draft.surnom(), Some("Le Rapide"));
        assert_eq!(draft.sexe(), Sexe::Feminin);
        assert_eq!(
            draft.date_naissance().map(|date| date.to_string()),
            Some("1990-04-12".to_owned())
        );
        assert_eq!(
            draft.infractions(),
            &[InfractionId::new(4), InfractionId::new(9)]
        );
    }

    #[test]
    fn bandit_form_rejects_unknown_sex_and_blank_name() {
        assert!(BanditForm::try_parse_from(["create-bandit", "Mbala", "--sexe", "X"]).is_err());

        let form = BanditForm::try_parse_from(["create-bandit", "  "])
            .unwrap_or_else(|_| unreachable!());
        assert!(matches!(
            form.bandit.into_draft(),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn capture_form_accepts_negative_coordinates() {
        let capture = capture_form(&[
            "--bandit",
            "3",
            "--infraction",
            "7",
            "-d",
            "Arrêté au marché",
            "--latitude",
            "-4.32",
            "--longitude",
            "15.31",
        ])
        .unwrap_or_else(|_| unreachable!());

        let draft = capture.into_draft().unwrap_or_else(|_| unreachable!());
        assert_eq!(
            draft.location(),
            Some(&CaptureLocation::Coordinates {
                latitude: -4.32,
                longitude: 15.31
            })
        );
    }

    #[test]
    fn capture_form_enforces_location_shape() {
        let base = ["--bandit", "3", "--infraction", "7", "-d", "Vol"];

        let lone_latitude = [&base[..], &["--latitude", "1.0"][..]].concat();
        assert!(capture_form(&lone_latitude).is_err());

        let both = [
            &base[..],
            &["--latitude", "1.0", "--longitude", "2.0", "--address", "Gombe"][..],
        ]
        .concat();
        assert!(capture_form(&both).is_err());

        let addressed = [&base[..], &["--address", "Gombe"][..]].concat();
        let draft = capture_form(&addressed)
            .unwrap_or_else(|_| unreachable!())
            .into_draft()
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(
            draft.location(),
            Some(&CaptureLocation::Address("Gombe".to_owned()))
        );
    }

    #[test]
    fn capture_form_requires_a_description_and_valid_photo() {
        let blank = capture_form(&["--bandit", "3", "--infraction", "7", "-d", " "])
            .unwrap_or_else(|_| unreachable!());
        assert!(matches!(blank.into_draft(), Err(AppError::Validation(_))));

        let photo = capture_form(&[
            "--bandit",
            "3",
            "--infraction",
            "7",
            "-d",
            "Vol",
            "--photo",
            "/tmp/photo.jpg",
        ])
        .unwrap_or_else(|_| unreachable!());
        assert!(matches!(photo.into_draft(), Err(AppError::Validation(_))));
    }
}
