// ============================================================================
// MODELS - MODULE PRINCIPAL
// ============================================================================
//
// Description:
//   Point d'entrée pour tous les modèles de données.
//   Chaque modèle correspond à une table avec SeaORM.
//
// Liste des modules:
//   - health : Health check API
//   - users : Utilisateurs (username unique, hash PBKDF2, flag staff)
//   - user_profile : Rôle de l'utilisateur (candidate / recruiter / both)
//   - candidate_profile : Profil candidat (CV, compétences, expérience)
//   - company : Entreprises publiant des offres
//   - job_offer : Offres d'emploi
//   - application : Candidatures (une seule par couple user / offre)
//   - dto : Data Transfer Objects pour les requêtes et réponses API
//
// Points d'attention:
//   - Les suppressions en cascade sont portées par les clés étrangères
//     (voir les attributs on_delete des relations et db::create_schema)
//   - company.owner_id passe à NULL quand le recruteur est supprimé
//
// ============================================================================

pub mod health;
pub mod users;
pub mod user_profile;
pub mod candidate_profile;
pub mod company;
pub mod job_offer;
pub mod application;
pub mod dto;
